use imbuf_common::image::{ImageBuffer, Pixels};
use imbuf_common::math::*;
use imbuf_common::options::EncodeOptions;

use crate::filter::{filter_row, filter_row_adaptive, FilterType};
use crate::*;

/// Encodes an image as non-interlaced PNG
///
/// Byte images are stored with 8 bit, float images with 16 bit samples.
/// [`EncodeOptions::deflate_level`] controls the compression.
pub fn encode(image: &ImageBuffer, options: &EncodeOptions) -> Result<Vec<u8>, Error> {
    let color_type = ColorType::for_channels(image.channels())
        .ok_or(imbuf_common::error::Error::UnsupportedChannels(image.channels()))?;

    let (bit_depth, raw) = match image.pixels() {
        Pixels::Byte(x) => (8, x.clone()),
        Pixels::Float(x) => (
            16,
            x.iter()
                .flat_map(|v| {
                    let v = (v.clamp(0., 1.) * f32::from(u16::MAX)).round() as u16;
                    v.to_be_bytes()
                })
                .collect(),
        ),
    };

    let header = Header {
        width: image.width(),
        height: image.height(),
        bit_depth,
        color_type,
        interlaced: false,
    };

    let level = options.deflate_level();
    let row_len = header.row_bytes(header.width)?;
    let bpp = header.filter_distance();

    let mut filtered = Vec::with_capacity(header.image_data_len()?);
    let mut prev: &[u8] = &vec![0; row_len];
    for row in raw.chunks_exact(row_len) {
        if level == 0 {
            filter_row(FilterType::None, row, prev, bpp, &mut filtered);
        } else {
            filter_row_adaptive(row, prev, bpp, &mut filtered);
        }
        prev = row;
    }

    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&filtered, level);

    tracing::debug!(
        "Encoded PNG {}x{} {:?}: {} bytes image data",
        header.width,
        header.height,
        color_type,
        compressed.len()
    );

    let mut out = Vec::with_capacity(compressed.len().safe_add(64)?);
    out.extend_from_slice(MAGIC_BYTES);
    Chunk::new(ChunkType::IHDR, &header.to_bytes()).write_to(&mut out)?;
    Chunk::new(ChunkType::IDAT, &compressed).write_to(&mut out)?;
    Chunk::new(ChunkType::IEND, &[]).write_to(&mut out)?;

    Ok(out)
}
