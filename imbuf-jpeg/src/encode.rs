use std::borrow::Cow;

use imbuf_common::flags::ColorRole;
use imbuf_common::image::ImageBuffer;
use imbuf_common::options::EncodeOptions;
use jpeg_encoder::ColorType;

use crate::Error;

/// Encodes an image as baseline JPEG with [`EncodeOptions::quality`]
///
/// Alpha channels are dropped and float samples are clamped to bytes.
pub fn encode(image: &ImageBuffer, options: &EncodeOptions) -> Result<Vec<u8>, Error> {
    let too_large = || Error::TooLarge {
        width: image.width(),
        height: image.height(),
    };
    let width = u16::try_from(image.width()).map_err(|_| too_large())?;
    let height = u16::try_from(image.height()).map_err(|_| too_large())?;

    let byte_image = image.with_role(ColorRole::DefaultByte);
    let (encoded_image, color_type): (Cow<ImageBuffer>, _) = match byte_image.channels() {
        1 => (Cow::Borrowed(&*byte_image), ColorType::Luma),
        2 => (byte_image.with_channels(1)?, ColorType::Luma),
        3 => (Cow::Borrowed(&*byte_image), ColorType::Rgb),
        _ => (Cow::Borrowed(&*byte_image), ColorType::Rgba),
    };

    let data = encoded_image.as_bytes().ok_or(Error::FloatSamples)?;

    let mut out = Vec::new();
    let encoder = jpeg_encoder::Encoder::new(&mut out, options.quality.clamp(1, 100));
    encoder.encode(data, width, height, color_type)?;

    tracing::debug!(
        "Encoded JPEG {width}x{height} {color_type:?} with quality {}: {} bytes",
        options.quality,
        out.len()
    );

    Ok(out)
}
