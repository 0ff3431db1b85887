use imbuf::*;

fn checkerboard() -> ImageBuffer {
    let mut pixels = Vec::new();
    for y in 0..12_u32 {
        for x in 0..10_u32 {
            // Constant in 2x2 cells to survive chroma subsampling
            let v = if (x / 2 + y / 2) % 2 == 0 { 230 } else { 20 };
            pixels.extend_from_slice(&[v, 255 - v, (x / 2 * 40) as u8]);
        }
    }
    ImageBuffer::from_bytes(10, 12, 3, pixels).unwrap()
}

fn encoded_samples(registry: &Registry) -> Vec<(FormatId, Vec<u8>)> {
    let image = checkerboard();
    registry
        .iter()
        .map(|format| {
            let data = format.encode(&image, &EncodeOptions::default()).unwrap();
            (format.id(), data)
        })
        .collect()
}

#[test]
fn only_own_format_sniffs() {
    let registry = Registry::builtin();

    for (id, data) in encoded_samples(&registry) {
        let matching: Vec<_> = registry
            .iter()
            .filter(|x| x.sniff(&data))
            .map(|x| x.id())
            .collect();
        assert_eq!(matching, [id]);
    }
}

#[test]
fn conversion_chain() {
    let registry = Registry::builtin();
    let original = checkerboard();
    let options = EncodeOptions::default();

    let mut image = original.clone();
    for id in [FormatId::PNG, FormatId::TGA, FormatId::BMP, FormatId::PNG] {
        let data = registry.save(&image, id, &options).unwrap();
        image = registry.load(&data).unwrap();
        assert_eq!(image.ftype(), Some(id));
    }

    assert_eq!(image.as_bytes(), original.as_bytes());
}

#[test]
fn float_chain() {
    let registry = Registry::builtin();
    let original = checkerboard();

    let hdr = registry
        .save(&original, FormatId::RADIANCE_HDR, &EncodeOptions::default())
        .unwrap();
    let float_image = registry.load(&hdr).unwrap();
    assert!(float_image.is_float());

    // PNG stores the float image as 16 bit and decodes it as float again
    let options = EncodeOptions::default().with_color_role(ColorRole::DefaultFloat);
    let png = registry.save(&float_image, FormatId::PNG, &options).unwrap();
    let from_png = registry.load(&png).unwrap();
    assert!(from_png.is_float());

    let a = original.as_bytes().unwrap();
    let b = from_png.to_byte();
    for (a, b) in a.iter().zip(b.as_bytes().unwrap()) {
        assert!(a.abs_diff(*b) <= 2);
    }
}

#[test]
fn jpeg_is_lossy_but_close() {
    let registry = Registry::builtin();
    let original = checkerboard();

    let data = registry
        .save(
            &original,
            FormatId::JPEG,
            &EncodeOptions::default().with_quality(100),
        )
        .unwrap();
    let jpeg = imbuf_jpeg::Jpeg::new(&data).unwrap();
    let (_, sof) = jpeg.sof().unwrap();
    assert_eq!((sof.x, sof.y), (10, 12));

    let loaded = registry.load(&data).unwrap();
    let total: u32 = original
        .as_bytes()
        .unwrap()
        .iter()
        .zip(loaded.as_bytes().unwrap())
        .map(|(a, b)| u32::from(a.abs_diff(*b)))
        .sum();
    assert!(total / (10 * 12 * 3) <= 12);
}

#[test]
fn png_compression_levels() {
    let registry = Registry::builtin();
    let image = checkerboard();

    let stored = registry
        .save(
            &image,
            FormatId::PNG,
            &EncodeOptions::default().with_compression(0),
        )
        .unwrap();
    let best = registry
        .save(
            &image,
            FormatId::PNG,
            &EncodeOptions::default().with_compression(100),
        )
        .unwrap();
    assert!(best.len() < stored.len());

    let png = imbuf_png::Png::new(&best).unwrap();
    assert_eq!(png.header().unwrap().color_type, imbuf_png::ColorType::Rgb);

    for data in [stored, best] {
        assert_eq!(registry.load(&data).unwrap().as_bytes(), image.as_bytes());
    }
}

#[test]
fn truncated_files() {
    let registry = Registry::builtin();

    for (id, data) in encoded_samples(&registry) {
        let format = registry.lookup(id).unwrap();

        // Not even a complete header
        for len in 0..16 {
            assert!(
                format.decode(&data[..len]).is_err(),
                "{} decoded from {len} bytes",
                format.name()
            );
            assert!(registry.load(&data[..len]).is_err());
        }

        // Longer prefixes may decode partially
        for len in 16..data.len() {
            let _ = format.decode(&data[..len]);
            let _ = registry.load(&data[..len]);
        }
    }
}

#[test]
fn flipped_bits() {
    let registry = Registry::builtin();

    for (id, data) in encoded_samples(&registry) {
        let format = registry.lookup(id).unwrap();

        for i in 0..data.len() {
            for bit in [0, 4, 7] {
                let mut corrupt = data.clone();
                corrupt[i] ^= 1 << bit;
                let _ = format.decode(&corrupt);
                let _ = registry.load(&corrupt);
            }
        }
    }
}

#[test]
fn png_checksums_catch_flipped_bits() {
    let registry = Registry::builtin();
    let png = registry.lookup(FormatId::PNG).unwrap();
    let data = png
        .encode(&checkerboard(), &EncodeOptions::default())
        .unwrap();

    // Every byte of the IHDR chunk after the signature, data and CRC included
    for i in 8..33 {
        let mut corrupt = data.clone();
        corrupt[i] ^= 0b10;
        assert!(png.decode(&corrupt).is_err(), "byte {i}");
    }
}

#[test]
fn headers_claiming_huge_images() {
    let registry = Registry::builtin();

    let hdr = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 60000 +X 60000\n";
    assert!(registry.load(hdr).is_err());

    // RLE true color, 65535x65535 at 32 bit, followed by one packet byte
    let tga = [
        0, 0, 10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 32, 8, 0xFF,
    ];
    let format = registry.lookup(FormatId::TGA).unwrap();
    assert!(format.decode(&tga).is_err());
    assert!(registry.load(&tga).is_err());

    // Baseline gray JPEG header claiming 65535x65535 pixels without scan data
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend_from_slice(&[0xFF, 0xC0, 0, 11, 8, 0xFF, 0xFF, 0xFF, 0xFF, 1, 1, 0x11, 0]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    assert!(registry.load(&jpeg).is_err());
}
