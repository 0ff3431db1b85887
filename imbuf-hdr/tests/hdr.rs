use imbuf_common::image::ImageBuffer;
use imbuf_common::options::EncodeOptions;
use imbuf_hdr::*;

/// 10x3 image, the first row is constant so it compresses into runs
fn test_image() -> ImageBuffer {
    let mut pixels = Vec::new();
    for _ in 0..10 {
        pixels.extend_from_slice(&[0.25, 0.5, 4.0]);
    }
    for y in 1..3 {
        for x in 0..10 {
            let v = (x * y) as f32 / 3.;
            pixels.extend_from_slice(&[v, 1. - v / 10., 12.5]);
        }
    }
    ImageBuffer::from_floats(10, 3, 3, pixels).unwrap()
}

fn assert_close(expected: &[f32], actual: &[f32]) {
    assert_eq!(expected.len(), actual.len());
    for (e, a) in expected.chunks_exact(3).zip(actual.chunks_exact(3)) {
        let max = e.iter().copied().fold(0., f32::max);
        for (e, a) in e.iter().zip(a) {
            assert!((e - a).abs() <= max / 100. + 1e-6, "{e} vs {a}");
        }
    }
}

#[test]
fn round_trip_with_and_without_rle() {
    let image = test_image();
    let mut sizes = Vec::new();

    for rle in [false, true] {
        let data = encode(&image, &EncodeOptions::default().with_rle(rle)).unwrap();
        assert!(is_filetype(&data));
        sizes.push(data.len());

        let decoded = decode(&data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 3));
        assert_eq!(decoded.channels(), 3);
        assert_close(image.as_floats().unwrap(), decoded.as_floats().unwrap());
    }

    assert!(sizes[1] < sizes[0]);
}

#[test]
fn narrow_images_are_stored_flat() {
    let image = ImageBuffer::from_floats(2, 1, 3, vec![1., 0.5, 0., 2., 2., 2.]).unwrap();
    let data = encode(&image, &EncodeOptions::default()).unwrap();
    let (_, offset) = Header::from_data(&data).unwrap();

    assert_eq!(&data[offset..], &[128, 64, 0, 129, 128, 128, 128, 130]);
}

#[test]
fn byte_image_with_alpha() {
    let image = ImageBuffer::from_bytes(1, 1, 4, vec![255, 0, 255, 7]).unwrap();
    let data = encode(&image, &EncodeOptions::default()).unwrap();
    let decoded = decode(&data).unwrap();

    assert_eq!(decoded.channels(), 3);
    assert_close(&[1., 0., 1.], decoded.as_floats().unwrap());
}

#[test]
fn header_fields() {
    let data = b"#?RGBE\n# comment\nEXPOSURE=2\nEXPOSURE=0.5\nGAMMA=1\n\n+Y 2 +X 1\n\
        \x80\x80\x80\x81\x80\x40\x00\x81";
    let (header, offset) = Header::from_data(data).unwrap();

    assert_eq!(header.format, None);
    assert_eq!(header.exposure, Some(1.));
    assert!(header.bottom_up);
    assert_eq!((header.width, header.height), (1, 2));
    assert_eq!(offset, data.len() - 8);

    // Rows are stored bottom to top
    let image = decode(data).unwrap();
    assert_eq!(image.as_floats().unwrap(), &[
        1.00390625, 0.50390625, 0.00390625, // top
        1.00390625, 1.00390625, 1.00390625, // bottom
    ]);
}

#[test]
fn old_style_runs() {
    let mut data = b"#?RADIANCE\n\n-Y 1 +X 4\n".to_vec();
    data.extend_from_slice(&[128, 0, 0, 129]);
    data.extend_from_slice(&[1, 1, 1, 3]);

    let image = decode(&data).unwrap();
    let floats = image.as_floats().unwrap();
    assert_eq!(floats.len(), 12);
    assert!(floats.chunks_exact(3).all(|x| x == [1.00390625, 0.00390625, 0.00390625]));
}

#[test]
fn unsupported_format() {
    let data = b"#?RADIANCE\nFORMAT=32-bit_rle_xyze\n\n-Y 1 +X 1\n\0\0\0\0";
    assert!(matches!(
        Header::from_data(data),
        Err(Error::UnsupportedFormat(format)) if format == "32-bit_rle_xyze"
    ));
}

#[test]
fn invalid_resolution() {
    for resolution in ["-X 1 +Y 1", "-Y one +X 1", "-Y 1"] {
        let data = format!("#?RADIANCE\n\n{resolution}\n");
        assert!(matches!(
            decode(data.as_bytes()),
            Err(Error::InvalidResolution(_))
        ));
    }
}

#[test]
fn invalid_run_length() {
    let mut data = b"#?RADIANCE\n\n-Y 1 +X 8\n".to_vec();
    data.extend_from_slice(&[2, 2, 0, 8, 0]);
    assert!(matches!(decode(&data), Err(Error::InvalidScanline)));

    // Run longer than the scanline
    let mut data = b"#?RADIANCE\n\n-Y 1 +X 8\n".to_vec();
    data.extend_from_slice(&[2, 2, 0, 8, 137, 1]);
    assert!(matches!(decode(&data), Err(Error::InvalidScanline)));
}

#[test]
fn truncated() {
    let data = encode(&test_image(), &EncodeOptions::default()).unwrap();

    assert!(matches!(
        decode(&data[..data.len() - 1]),
        Err(Error::UnexpectedEof)
    ));
    assert!(matches!(decode(&data[..12]), Err(Error::UnexpectedEof)));
    assert!(matches!(decode(b"P6\n"), Err(Error::InvalidMagicBytes(_))));
}

#[test]
fn dimensions_beyond_data() {
    let data = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 60000 +X 60000\n";
    assert!(matches!(
        decode(data),
        Err(Error::InsufficientData { pixels: 3_600_000_000, len: 0 })
    ));

    // Four bytes cannot cover a thousand pixels
    let mut data = b"#?RADIANCE\n\n-Y 1 +X 1000\n".to_vec();
    data.extend_from_slice(&[128, 0, 0, 129]);
    assert!(matches!(
        decode(&data),
        Err(Error::InsufficientData { pixels: 1000, len: 4 })
    ));
}

#[test]
fn empty_dimensions() {
    for resolution in ["-Y 4000000000 +X 0", "-Y 0 +X 12"] {
        let data = format!("#?RADIANCE\n\n{resolution}\n");
        assert!(matches!(
            decode(data.as_bytes()),
            Err(Error::InvalidDimensions { .. })
        ));
    }
}
