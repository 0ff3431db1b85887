use imbuf_common::flags::ColorRole;
use imbuf_common::image::ImageBuffer;
use imbuf_common::math::*;
use imbuf_common::options::EncodeOptions;

use crate::*;

const INFO_HEADER_LEN: u32 = 40;
/// 2835 pixels per meter is 72 DPI
const PIXELS_PER_METER: i32 = 2835;

/// Encodes an image as bottom-up BMP
///
/// Images with alpha channel are stored with 32 bits per pixel, all others
/// with 24 bits. No options apply to BMP.
pub fn encode(image: &ImageBuffer, _options: &EncodeOptions) -> Result<Vec<u8>, Error> {
    let has_alpha = image.has_alpha();
    let byte_image = image.with_role(ColorRole::DefaultByte);
    let rgb_image = byte_image.with_channels(if has_alpha { 4 } else { 3 })?;
    let pixels = rgb_image.as_bytes().unwrap_or_default();

    let channels = usize::from(rgb_image.channels());
    let bit_count = if has_alpha { 32 } else { 24 };
    let width = image.width().usize()?;

    let header = InfoHeader {
        data_offset: FILE_HEADER_LEN.u32()?.safe_add(INFO_HEADER_LEN)?,
        header_size: INFO_HEADER_LEN,
        width: i32::try_from(image.width())
            .map_err(|_| MathError::ConversionFailed(Some(image.width().into())))?,
        height: i32::try_from(image.height())
            .map_err(|_| MathError::ConversionFailed(Some(image.height().into())))?,
        bit_count,
        compression: Compression::Rgb,
        colors_used: 0,
        masks: None,
    };

    let stride = header.row_stride()?;
    let image_size = stride.safe_mul(image.height().usize()?)?;
    let file_size = image_size.safe_add(header.data_offset.usize()?)?;

    let mut out = Vec::with_capacity(file_size);
    out.extend_from_slice(MAGIC_BYTES);
    out.extend_from_slice(&file_size.u32()?.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&header.data_offset.to_le_bytes());

    out.extend_from_slice(&header.header_size.to_le_bytes());
    out.extend_from_slice(&header.width.to_le_bytes());
    out.extend_from_slice(&header.height.to_le_bytes());
    // Planes
    out.extend_from_slice(&1_u16.to_le_bytes());
    out.extend_from_slice(&header.bit_count.to_le_bytes());
    out.extend_from_slice(&u32::from(header.compression).to_le_bytes());
    out.extend_from_slice(&image_size.u32()?.to_le_bytes());
    out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    // Colors used and important
    out.extend_from_slice(&[0; 8]);

    let row_len = width.safe_mul(channels)?;
    let padding = stride.safe_sub(width.safe_mul(usize::from(bit_count / 8))?)?;
    for row in pixels.chunks_exact(row_len).rev() {
        for px in row.chunks_exact(channels) {
            match *px {
                [r, g, b] => out.extend_from_slice(&[b, g, r]),
                [r, g, b, a] => out.extend_from_slice(&[b, g, r, a]),
                _ => {}
            }
        }
        out.extend(std::iter::repeat(0).take(padding));
    }

    tracing::debug!(
        "Encoded BMP {}x{} with {bit_count} bits per pixel",
        header.width,
        header.height
    );

    Ok(out)
}
