use imbuf_common::flags::ColorRole;
use imbuf_common::image::ImageBuffer;
use imbuf_common::options::EncodeOptions;

use crate::*;

/// Encodes an image as top-to-bottom Targa with TGA 2.0 footer
///
/// Gray images are stored with 8 bit, RGB with 24 bit and images with alpha
/// as 32 bit BGRA. Run length encoding is used if [`EncodeOptions::rle`] is
/// set.
pub fn encode(image: &ImageBuffer, options: &EncodeOptions) -> Result<Vec<u8>, Error> {
    let too_large = || Error::TooLarge {
        width: image.width(),
        height: image.height(),
    };
    let width = u16::try_from(image.width()).map_err(|_| too_large())?;
    let height = u16::try_from(image.height()).map_err(|_| too_large())?;

    let byte_image = image.with_role(ColorRole::DefaultByte);
    let channels = match byte_image.channels() {
        1 => 1,
        3 => 3,
        _ => 4,
    };
    let converted = byte_image.with_channels(channels)?;
    let pixels = converted.as_bytes().unwrap_or_default();

    let (image_type, pixel_depth, alpha_bits) = match (channels, options.rle) {
        (1, false) => (ImageType::Grayscale, 8, 0),
        (1, true) => (ImageType::RleGrayscale, 8, 0),
        (3, false) => (ImageType::TrueColor, 24, 0),
        (3, true) => (ImageType::RleTrueColor, 24, 0),
        (_, false) => (ImageType::TrueColor, 32, 8),
        (_, true) => (ImageType::RleTrueColor, 32, 8),
    };

    let header = Header {
        id_length: 0,
        color_map_type: 0,
        image_type,
        color_map_first: 0,
        color_map_length: 0,
        color_map_depth: 0,
        width,
        height,
        pixel_depth,
        descriptor: Header::TOP_TO_BOTTOM | alpha_bits,
    };

    // Stored as BGR(A)
    let n = usize::from(channels);
    let mut stored = Vec::with_capacity(pixels.len());
    for px in pixels.chunks_exact(n) {
        match *px {
            [r, g, b] => stored.extend_from_slice(&[b, g, r]),
            [r, g, b, a] => stored.extend_from_slice(&[b, g, r, a]),
            _ => stored.extend_from_slice(px),
        }
    }

    let mut out = header.to_bytes().to_vec();
    if options.rle {
        let row_len = usize::from(width) * n;
        for row in stored.chunks_exact(row_len) {
            encode_rle_row(row, n, &mut out);
        }
    } else {
        out.extend_from_slice(&stored);
    }

    // Extension and developer area offsets
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(FOOTER_SIGNATURE);

    tracing::debug!(
        "Encoded TGA {width}x{height} {image_type:?}: {} bytes",
        out.len()
    );

    Ok(out)
}

/// Run length encodes one scanline, packets do not cross scanlines
fn encode_rle_row(row: &[u8], bpp: usize, out: &mut Vec<u8>) {
    let pixels = row.chunks_exact(bpp).collect::<Vec<_>>();
    let run_at = |i: usize| {
        pixels[i..]
            .iter()
            .take(128)
            .take_while(|x| **x == pixels[i])
            .count()
    };

    let mut i = 0;
    while i < pixels.len() {
        let run = run_at(i);
        if run > 1 {
            out.push(0x80 | (run - 1) as u8);
            out.extend_from_slice(pixels[i]);
            i += run;
            continue;
        }

        // Raw packet up to the next run
        let start = i;
        while i < pixels.len() && i - start < 128 && (i == start || run_at(i) < 2) {
            i += 1;
        }
        out.push((i - start - 1) as u8);
        for px in &pixels[start..i] {
            out.extend_from_slice(px);
        }
    }
}
