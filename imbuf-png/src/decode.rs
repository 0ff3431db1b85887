use imbuf_common::image::{ImageBuffer, Pixels};
use imbuf_common::math::*;

use crate::filter::unfilter_row;
use crate::*;

/// Decodes a PNG file
///
/// Images with 16 bit samples are returned as float images, all other images
/// with byte samples. Palettes are expanded to RGB and `tRNS` transparency
/// adds an alpha channel.
pub fn decode(data: &[u8]) -> Result<ImageBuffer, Error> {
    let png = Png::new(data)?;
    let header = png.header()?;

    tracing::debug!(
        "Decoding PNG {}x{} {:?} with bit depth {}",
        header.width,
        header.height,
        header.color_type,
        header.bit_depth
    );

    let samples = read_samples(&png, &header)?;
    let transparency = png.transparency();

    if header.color_type == ColorType::Indexed {
        let palette = png.palette()?.ok_or(Error::NoPalette)?;
        return expand_palette(&header, &samples, &palette, transparency);
    }

    let mut channels = header.color_type.samples();
    let key = transparency.and_then(|x| transparency_key(header.color_type, x));
    if key.is_some() {
        channels += 1;
    }

    let pixels = if header.bit_depth == 16 {
        Pixels::Float(convert_samples(&samples, &header, key.as_deref(), |v| {
            f32::from(v) / f32::from(u16::MAX)
        }))
    } else {
        let max = (1_u16 << header.bit_depth) - 1;
        Pixels::Byte(convert_samples(&samples, &header, key.as_deref(), |v| {
            (u32::from(v) * 255 / u32::from(max)) as u8
        }))
    };

    Ok(ImageBuffer::new(
        header.width,
        header.height,
        channels,
        pixels,
    )?)
}

/// Decompresses and unfilters the image data into one value per sample
fn read_samples(png: &Png, header: &Header) -> Result<Vec<u16>, Error> {
    let idat = png.image_data()?;
    let expected = header.image_data_len()?;

    let raw = miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(&idat, expected)
        .map_err(Error::Zlib)?;
    if raw.len() < expected {
        return Err(Error::UnexpectedEndOfImageData);
    }

    let samples_per_pixel = usize::from(header.color_type.samples());
    let width = header.width.usize()?;
    let len = ImageBuffer::sample_count(header.width, header.height, header.color_type.samples())?;
    let mut samples = vec![0_u16; len];

    let bpp = header.filter_distance();
    let mut pos = 0_usize;
    let mut row_samples = Vec::new();

    for pass in header.passes().iter().filter(|x| !x.is_empty()) {
        let row_len = header.row_bytes(pass.width)?;
        let mut prev = vec![0; row_len];

        for py in 0..pass.height {
            let filter_type = *raw.get(pos).ok_or(Error::UnexpectedEndOfImageData)?;
            let start = pos.safe_add(1)?;
            pos = start.safe_add(row_len)?;
            let mut row = raw
                .get(start..pos)
                .ok_or(Error::UnexpectedEndOfImageData)?
                .to_vec();

            unfilter_row(filter_type, &mut row, &prev, bpp)?;

            row_samples.clear();
            unpack_row(&row, header.bit_depth, &mut row_samples);

            let y = pass.y0.safe_add(py.safe_mul(pass.dy)?)?.usize()?;
            for (px, pixel) in row_samples
                .chunks_exact(samples_per_pixel)
                .take(pass.width.usize()?)
                .enumerate()
            {
                let x = pass.x0.usize()?.safe_add(px.safe_mul(pass.dx.usize()?)?)?;
                let offset = y.safe_mul(width)?.safe_add(x)?.safe_mul(samples_per_pixel)?;
                samples
                    .get_mut(offset..offset.safe_add(samples_per_pixel)?)
                    .ok_or(Error::UnexpectedEndOfImageData)?
                    .copy_from_slice(pixel);
            }

            prev = row;
        }
    }

    Ok(samples)
}

/// Splits a scanline into samples
///
/// Samples with less than 8 bits are packed starting from the most
/// significant bit. Trailing bits of the last byte are returned as well.
fn unpack_row(row: &[u8], bit_depth: u8, out: &mut Vec<u16>) {
    match bit_depth {
        16 => out.extend(
            row.chunks_exact(2)
                .map(|x| u16::from_be_bytes([x[0], x[1]])),
        ),
        8 => out.extend(row.iter().map(|x| u16::from(*x))),
        _ => {
            let mask = (1_u8 << bit_depth) - 1;
            let per_byte = 8 / bit_depth;
            for byte in row {
                for i in 0..per_byte {
                    let shift = 8 - bit_depth * (i + 1);
                    out.push(u16::from((byte >> shift) & mask));
                }
            }
        }
    }
}

/// Sample values of the color that `tRNS` marks as fully transparent
fn transparency_key(color_type: ColorType, trns: &[u8]) -> Option<Vec<u16>> {
    let n = match color_type {
        ColorType::Grayscale => 1,
        ColorType::Rgb => 3,
        _ => return None,
    };

    let key = trns
        .chunks_exact(2)
        .take(n)
        .map(|x| u16::from_be_bytes([x[0], x[1]]))
        .collect::<Vec<_>>();

    (key.len() == n).then_some(key)
}

fn convert_samples<T: Copy + Opaque>(
    samples: &[u16],
    header: &Header,
    key: Option<&[u16]>,
    convert: impl Fn(u16) -> T,
) -> Vec<T> {
    let Some(key) = key else {
        return samples.iter().map(|v| convert(*v)).collect();
    };

    let n = usize::from(header.color_type.samples());
    let mut out = Vec::with_capacity(samples.len() / n * (n + 1));
    for pixel in samples.chunks_exact(n) {
        out.extend(pixel.iter().map(|v| convert(*v)));
        out.push(if pixel == key { T::TRANSPARENT } else { T::OPAQUE });
    }
    out
}

trait Opaque {
    const OPAQUE: Self;
    const TRANSPARENT: Self;
}

impl Opaque for u8 {
    const OPAQUE: Self = u8::MAX;
    const TRANSPARENT: Self = 0;
}

impl Opaque for f32 {
    const OPAQUE: Self = 1.;
    const TRANSPARENT: Self = 0.;
}

fn expand_palette(
    header: &Header,
    indices: &[u16],
    palette: &[[u8; 3]],
    transparency: Option<&[u8]>,
) -> Result<ImageBuffer, Error> {
    let channels: u8 = if transparency.is_some() { 4 } else { 3 };
    let mut out = Vec::with_capacity(indices.len().safe_mul(usize::from(channels))?);

    for index in indices {
        let i = usize::from(*index);
        let rgb = palette
            .get(i)
            .ok_or(Error::PaletteIndexOutOfRange(*index))?;
        out.extend_from_slice(rgb);

        if let Some(trns) = transparency {
            // Entries missing from tRNS are opaque
            out.push(trns.get(i).copied().unwrap_or(u8::MAX));
        }
    }

    Ok(ImageBuffer::from_bytes(
        header.width,
        header.height,
        channels,
        out,
    )?)
}
