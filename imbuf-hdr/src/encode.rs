use imbuf_common::flags::ColorRole;
use imbuf_common::image::ImageBuffer;
use imbuf_common::options::EncodeOptions;

use crate::*;

/// Runs shorter than this are stored as literals
const MIN_RUN: usize = 4;

/// Encodes an image as Radiance HDR
///
/// Alpha is dropped and gray is stored as RGB. Scanlines use adaptive run
/// length encoding if [`EncodeOptions::rle`] is set and the width is between
/// 8 and 32767.
pub fn encode(image: &ImageBuffer, options: &EncodeOptions) -> Result<Vec<u8>, Error> {
    let float_image = image.with_role(ColorRole::DefaultFloat);
    let rgb_image = float_image.with_channels(3)?;
    let pixels = rgb_image.as_floats().unwrap_or_default();

    let header = Header {
        format: Some(FORMAT_RGBE.to_string()),
        exposure: None,
        width: image.width(),
        height: image.height(),
        bottom_up: false,
    };

    let width = image.width() as usize;
    let rle = options.rle && (8..=0x7FFF).contains(&width);

    let mut out = header.to_bytes();
    let mut scanline = Vec::with_capacity(width);
    let mut channel = Vec::with_capacity(width);

    for row in pixels.chunks_exact(width * 3) {
        scanline.clear();
        scanline.extend(
            row.chunks_exact(3)
                .map(|x| float_to_rgbe([x[0], x[1], x[2]])),
        );

        if rle {
            out.extend_from_slice(&[2, 2, (width >> 8) as u8, (width & 0xFF) as u8]);
            for c in 0..4 {
                channel.clear();
                channel.extend(scanline.iter().map(|px: &[u8; 4]| px[c]));
                encode_channel(&channel, &mut out);
            }
        } else {
            out.extend(scanline.iter().flatten());
        }
    }

    tracing::debug!(
        "Encoded HDR {}x{}, rle: {rle}: {} bytes",
        header.width,
        header.height,
        out.len()
    );

    Ok(out)
}

/// Run length encodes the values of one channel
fn encode_channel(data: &[u8], out: &mut Vec<u8>) {
    let mut cur = 0;

    while cur < data.len() {
        // Find the next run of at least MIN_RUN values
        let mut beg_run = cur;
        let mut run_count = 0;
        let mut old_run_count = 0;
        while run_count < MIN_RUN && beg_run < data.len() {
            beg_run += run_count;
            old_run_count = run_count;
            run_count = 1;
            while beg_run + run_count < data.len()
                && run_count < 127
                && data[beg_run] == data[beg_run + run_count]
            {
                run_count += 1;
            }
        }

        // A short run directly before the long run
        if old_run_count > 1 && old_run_count == beg_run - cur {
            out.extend_from_slice(&[128 + old_run_count as u8, data[cur]]);
            cur = beg_run;
        }

        // Literals up to the run
        while cur < beg_run {
            let count = (beg_run - cur).min(128);
            out.push(count as u8);
            out.extend_from_slice(&data[cur..cur + count]);
            cur += count;
        }

        if run_count >= MIN_RUN {
            out.extend_from_slice(&[128 + run_count as u8, data[beg_run]]);
            cur += run_count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_runs() {
        let mut out = Vec::new();
        encode_channel(&[1, 2, 3, 3, 3, 3, 3, 4, 4], &mut out);
        assert_eq!(out, [2, 1, 2, 133, 3, 130, 4]);
    }

    #[test]
    fn short_run_before_long_run() {
        let mut out = Vec::new();
        encode_channel(&[7, 7, 9, 9, 9, 9], &mut out);
        assert_eq!(out, [130, 7, 132, 9]);
    }
}
