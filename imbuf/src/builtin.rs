//! Descriptors of the formats implemented in this workspace

#[cfg(any(
    feature = "bmp",
    feature = "hdr",
    feature = "jpeg",
    feature = "png",
    feature = "tga"
))]
use imbuf_common::flags::{ColorRole, FormatFlags};
#[cfg(any(
    feature = "bmp",
    feature = "hdr",
    feature = "jpeg",
    feature = "png",
    feature = "tga"
))]
use imbuf_common::format_id::FormatId;

use crate::FormatDescriptor;

/// All compiled in formats in table order
pub fn formats() -> Vec<FormatDescriptor> {
    #[allow(unused_mut)]
    let mut formats = Vec::new();

    #[cfg(feature = "jpeg")]
    formats.push(jpeg());
    #[cfg(feature = "png")]
    formats.push(png());
    #[cfg(feature = "bmp")]
    formats.push(bmp());
    #[cfg(feature = "tga")]
    formats.push(tga());
    #[cfg(feature = "hdr")]
    formats.push(hdr());

    formats
}

#[cfg(feature = "jpeg")]
pub fn jpeg() -> FormatDescriptor {
    use std::path::Path;

    use imbuf_common::image::Thumbnail;

    use crate::BoxError;

    FormatDescriptor::new(
        FormatId::JPEG,
        "JPEG",
        imbuf_jpeg::Jpeg::is_filetype,
        imbuf_jpeg::decode,
    )
    .with_extensions(&["jpg", "jpeg", "jpe", "jfif"])
    .with_encoder(imbuf_jpeg::encode)
    .with_thumbnail_loader(
        |path: &Path, max_size: u32| -> Result<Thumbnail, BoxError> {
            let data = std::fs::read(path)?;
            Ok(imbuf_jpeg::thumbnail(&data, max_size)?)
        },
    )
    .with_flags(FormatFlags::LOSSY)
    .with_default_save_role(ColorRole::DefaultByte)
    .with_init(imbuf_jpeg::init)
    .with_exit(imbuf_jpeg::exit)
}

#[cfg(feature = "png")]
pub fn png() -> FormatDescriptor {
    FormatDescriptor::new(
        FormatId::PNG,
        "PNG",
        imbuf_png::Png::is_filetype,
        imbuf_png::decode,
    )
    .with_extensions(&["png"])
    .with_encoder(imbuf_png::encode)
    .with_flags(FormatFlags::ALPHA)
    .with_default_save_role(ColorRole::DefaultByte)
}

#[cfg(feature = "bmp")]
pub fn bmp() -> FormatDescriptor {
    FormatDescriptor::new(FormatId::BMP, "BMP", imbuf_bmp::is_filetype, imbuf_bmp::decode)
        .with_extensions(&["bmp", "dib"])
        .with_encoder(imbuf_bmp::encode)
        .with_flags(FormatFlags::ALPHA)
        .with_default_save_role(ColorRole::DefaultByte)
}

#[cfg(feature = "tga")]
pub fn tga() -> FormatDescriptor {
    FormatDescriptor::new(FormatId::TGA, "Targa", imbuf_tga::is_filetype, imbuf_tga::decode)
        .with_extensions(&["tga"])
        .with_encoder(imbuf_tga::encode)
        .with_flags(FormatFlags::ALPHA)
        .with_default_save_role(ColorRole::DefaultByte)
}

#[cfg(feature = "hdr")]
pub fn hdr() -> FormatDescriptor {
    FormatDescriptor::new(
        FormatId::RADIANCE_HDR,
        "Radiance HDR",
        imbuf_hdr::is_filetype,
        imbuf_hdr::decode,
    )
    .with_extensions(&["hdr", "pic"])
    .with_encoder(imbuf_hdr::encode)
    .with_flags(FormatFlags::FLOAT)
    .with_default_save_role(ColorRole::DefaultFloat)
}
