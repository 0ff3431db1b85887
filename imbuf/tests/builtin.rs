use std::path::PathBuf;

use imbuf::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("imbuf-{}-{name}", std::process::id()))
}

/// Smooth RGBA test image
fn gradient(width: u32, height: u32) -> ImageBuffer {
    let mut pixels = Vec::new();
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[
                (x * 255 / width) as u8,
                (y * 255 / height) as u8,
                128,
                255,
            ]);
        }
    }
    ImageBuffer::from_bytes(width, height, 4, pixels).unwrap()
}

#[test]
fn table_order_and_ids() {
    let registry = Registry::builtin();
    let ids: Vec<_> = registry.iter().map(|x| x.id()).collect();

    assert_eq!(
        ids,
        [
            FormatId::JPEG,
            FormatId::PNG,
            FormatId::BMP,
            FormatId::TGA,
            FormatId::RADIANCE_HDR
        ]
    );

    // Unique ids
    assert!(Registry::new(imbuf::builtin::formats()).is_ok());

    for format in &registry {
        assert_eq!(registry.lookup(format.id()).unwrap().id(), format.id());
        assert!(format.has_encoder());
        assert!(!format.extensions().is_empty());
    }

    assert!(registry.lookup(FormatId::OPENEXR).is_none());
    assert!(registry.lookup(FormatId::WEBP).is_none());
}

#[test]
fn flags_and_roles() {
    let registry = Registry::builtin();

    let jpeg = registry.lookup(FormatId::JPEG).unwrap();
    assert_eq!(jpeg.flags(), FormatFlags::LOSSY);
    assert!(jpeg.has_thumbnail_loader());
    assert!(jpeg.has_init() && jpeg.has_exit());

    let hdr = registry.lookup(FormatId::RADIANCE_HDR).unwrap();
    assert!(hdr.flags().contains(FormatFlags::FLOAT));
    assert_eq!(hdr.default_save_role(), ColorRole::DefaultFloat);

    for id in [FormatId::PNG, FormatId::BMP, FormatId::TGA] {
        let format = registry.lookup(id).unwrap();
        assert_eq!(format.flags(), FormatFlags::ALPHA);
        assert_eq!(format.default_save_role(), ColorRole::DefaultByte);
        assert!(!format.has_init());
    }
}

#[test]
fn lossless_round_trips() {
    let registry = Registry::builtin();
    let image = gradient(13, 7);

    for id in [FormatId::PNG, FormatId::BMP, FormatId::TGA] {
        let data = registry
            .save(&image, id, &EncodeOptions::default())
            .unwrap();
        assert_eq!(registry.detect(&data).unwrap().id(), id);

        let loaded = registry.load(&data).unwrap();
        assert_eq!(loaded.ftype(), Some(id));
        assert_eq!(registry.lookup_image(&loaded).unwrap().id(), id);
        assert_eq!(loaded.channels(), 4, "{id}");
        assert_eq!(loaded.as_bytes(), image.as_bytes(), "{id}");
    }
}

#[test]
fn jpeg_round_trip() {
    let mut registry = Registry::builtin();
    registry.initialize_all().unwrap();
    assert!(imbuf::jpeg::is_initialized());

    let image = gradient(32, 16);
    let data = registry
        .save(&image, FormatId::JPEG, &EncodeOptions::default().with_quality(95))
        .unwrap();
    let loaded = registry.load(&data).unwrap();

    assert_eq!(loaded.ftype(), Some(FormatId::JPEG));
    assert_eq!(loaded.channels(), 3);
    let expected = image.with_channels(3).unwrap();
    let error: u32 = expected
        .as_bytes()
        .unwrap()
        .iter()
        .zip(loaded.as_bytes().unwrap())
        .map(|(a, b)| u32::from(a.abs_diff(*b)))
        .sum();
    assert!(error / (32 * 16 * 3) <= 4);

    registry.shutdown_all().unwrap();
}

#[test]
fn hdr_saves_float() {
    let registry = Registry::builtin();
    let image = gradient(9, 2);

    let data = registry
        .save(&image, FormatId::RADIANCE_HDR, &EncodeOptions::default())
        .unwrap();
    let loaded = registry.load(&data).unwrap();

    assert!(loaded.is_float());
    assert_eq!(loaded.channels(), 3);
    let back = loaded.to_byte();
    let expected = image.with_channels(3).unwrap();
    for (a, b) in expected.as_bytes().unwrap().iter().zip(back.as_bytes().unwrap()) {
        assert!(a.abs_diff(*b) <= 2, "{a} {b}");
    }
}

#[test]
fn png_color_role_override() {
    let registry = Registry::builtin();
    let image = gradient(4, 4);

    let options = EncodeOptions::default().with_color_role(ColorRole::DefaultFloat);
    let data = registry.save(&image, FormatId::PNG, &options).unwrap();

    // Float pixels are stored with 16 bit
    let png = imbuf::png::Png::new(&data).unwrap();
    assert_eq!(png.header().unwrap().bit_depth, 16);
    assert!(registry.load(&data).unwrap().is_float());
}

#[test]
fn save_and_load_paths() {
    let registry = Registry::builtin();
    let image = gradient(20, 10);

    let path = temp_path("image.TGA");
    registry
        .save_path(&image, &path, None, &EncodeOptions::default())
        .unwrap();
    let loaded = registry.load_path(&path).unwrap();
    assert_eq!(loaded.ftype(), Some(FormatId::TGA));

    // Explicit format wins over the extension
    registry
        .save_path(&image, &path, Some(FormatId::BMP), &EncodeOptions::default())
        .unwrap();
    assert_eq!(
        registry.load_path(&path).unwrap().ftype(),
        Some(FormatId::BMP)
    );
    std::fs::remove_file(&path).unwrap();

    let err = registry
        .save_path(&image, temp_path("image.xyz"), None, &EncodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownExtension(x) if x == "xyz"));

    assert!(matches!(
        registry.load_path(temp_path("missing.png")),
        Err(Error::Io(_))
    ));
}

#[test]
fn thumbnails() {
    let registry = Registry::builtin();
    let image = gradient(64, 32);

    // PNG has no thumbnail loader and is decoded fully
    let path = temp_path("thumb.png");
    registry
        .save_path(&image, &path, None, &EncodeOptions::default())
        .unwrap();
    let thumbnail = registry.load_thumbnail(&path, 16).unwrap();
    assert_eq!((thumbnail.image.width(), thumbnail.image.height()), (16, 8));
    assert_eq!((thumbnail.full_width, thumbnail.full_height), (64, 32));
    assert_eq!(thumbnail.image.ftype(), Some(FormatId::PNG));
    std::fs::remove_file(&path).unwrap();

    // JPEG thumbnails use the DC coefficients
    let path = temp_path("thumb.jpg");
    registry
        .save_path(&image, &path, None, &EncodeOptions::default())
        .unwrap();
    let thumbnail = registry.load_thumbnail(&path, 8).unwrap();
    assert_eq!((thumbnail.image.width(), thumbnail.image.height()), (8, 4));
    assert_eq!((thumbnail.full_width, thumbnail.full_height), (64, 32));
    assert_eq!(thumbnail.image.ftype(), Some(FormatId::JPEG));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn unknown_data() {
    let registry = Registry::builtin();
    assert!(registry.detect(b"GIF89a").is_none());
    assert!(matches!(
        registry.load(b"GIF89a"),
        Err(Error::NoSupportedFiletypeFound)
    ));
}
