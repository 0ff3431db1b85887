use imbuf_common::image::ImageBuffer;
use imbuf_common::options::EncodeOptions;
use imbuf_jpeg::*;

fn segment(marker: Marker, data: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, marker.into()];
    out.extend_from_slice(&(data.len() as u16 + 2).to_be_bytes());
    out.extend_from_slice(data);
    out
}

/// Gray image of `blocks` 8x8 blocks in a row, every block has DC value 8
/// and a restart marker in between
fn dc_only_jpeg(blocks: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];

    let mut sof = vec![8];
    sof.extend_from_slice(&8_u16.to_be_bytes());
    sof.extend_from_slice(&(blocks * 8).to_be_bytes());
    sof.extend_from_slice(&[1, 1, 0x11, 0]);

    let mut dqt = vec![0x00];
    dqt.extend_from_slice(&[1; 64]);

    // DC: code 0 is category 0, code 1 is category 4
    let mut dht = vec![0x00, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4];
    // AC: code 0 is end of block
    dht.extend_from_slice(&[0x10, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00]);

    data.extend(segment(Marker::DQT, &dqt));
    data.extend(segment(Marker::SOF0, &sof));
    data.extend(segment(Marker::DHT, &dht));
    data.extend(segment(Marker::DRI, &1_u16.to_be_bytes()));
    data.extend(segment(Marker::SOS, &[1, 1, 0x00, 0, 63, 0]));

    for i in 0..blocks {
        if i > 0 {
            data.extend_from_slice(&[0xFF, 0xD0 + (i - 1) as u8 % 8]);
        }
        // DC category 4, value 8, end of block, padding
        data.push(0b1_1000_0_11);
    }

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

#[test]
fn dc_only_blocks_with_restarts() {
    let data = dc_only_jpeg(3);
    let image = decode(&data).unwrap();

    assert_eq!(image.width(), 24);
    assert_eq!(image.height(), 8);
    assert_eq!(image.channels(), 1);
    // Without resetting the DC prediction the blocks would get brighter
    assert!(image.as_bytes().unwrap().iter().all(|x| *x == 129));
}

#[test]
fn segments() {
    let data = dc_only_jpeg(2);
    let jpeg = Jpeg::new(&data).unwrap();

    let markers = jpeg
        .segments()
        .iter()
        .map(|x| x.marker())
        .collect::<Vec<_>>();
    assert_eq!(
        markers,
        [
            Marker::DQT,
            Marker::SOF0,
            Marker::DHT,
            Marker::DRI,
            Marker::SOS,
            Marker::EOI
        ]
    );

    let sos = jpeg.segments_marker(Marker::SOS).next().unwrap();
    assert_eq!(sos.entropy_coded_data(), [0b1100_0011, 0xFF, 0xD0, 0b1100_0011]);

    let (marker, sof) = jpeg.sof().unwrap();
    assert_eq!(marker, Marker::SOF0);
    assert_eq!((sof.x, sof.y), (16, 8));
}

#[test]
fn dc_thumbnail() {
    let data = dc_only_jpeg(2);
    let thumbnail = thumbnail(&data, 2).unwrap();

    assert_eq!(thumbnail.full_width, 16);
    assert_eq!(thumbnail.full_height, 8);
    assert_eq!(thumbnail.image.width(), 2);
    assert_eq!(thumbnail.image.height(), 1);
    assert_eq!(thumbnail.image.as_bytes().unwrap(), [129, 129]);
}

#[test]
fn progressive_is_unsupported() {
    let mut data = dc_only_jpeg(1);
    // Turn SOF0 into SOF2
    let pos = data
        .windows(2)
        .position(|x| x == [0xFF, 0xC0])
        .unwrap();
    data[pos + 1] = 0xC2;

    assert!(matches!(
        decode(&data),
        Err(Error::UnsupportedProcess(Marker::SOF2))
    ));
}

#[test]
fn missing_huffman_table() {
    let data = dc_only_jpeg(1);
    let jpeg = Jpeg::new(&data).unwrap();
    let dht = jpeg.segments_marker(Marker::DHT).next().unwrap();

    // Drop the DHT segment including marker and length
    let start = dht.pos();
    let end = start + 4 + dht.data().len();
    let mut data = data.clone();
    data.drain(start..end);

    assert!(matches!(
        decode(&data),
        Err(Error::MissingHuffmanTable { class: 0, id: 0 })
    ));
}

#[test]
fn not_a_jpeg() {
    assert!(!Jpeg::is_filetype(b"\x89PNG\r\n\x1a\n"));
    assert!(matches!(
        Jpeg::new(b"\x89PNG\r\n\x1a\n"),
        Err(Error::InvalidMagicBytes(_))
    ));
}

/// Gray image of the given width with a single DC table and an AC table
/// where code `0` ends the block
fn gray_jpeg(width: u16, dqt: &[u8], dc_bits: [u8; 16], dc_values: &[u8], scan: &[u8]) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];

    let mut sof = vec![8];
    sof.extend_from_slice(&8_u16.to_be_bytes());
    sof.extend_from_slice(&width.to_be_bytes());
    sof.extend_from_slice(&[1, 1, 0x11, 0]);

    let mut dht = vec![0x00];
    dht.extend_from_slice(&dc_bits);
    dht.extend_from_slice(dc_values);
    dht.extend_from_slice(&[0x10, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00]);

    data.extend(segment(Marker::DQT, dqt));
    data.extend(segment(Marker::SOF0, &sof));
    data.extend(segment(Marker::DHT, &dht));
    data.extend(segment(Marker::SOS, &[1, 1, 0x00, 0, 63, 0]));
    data.extend_from_slice(scan);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// Packs `(value, length)` codes MSB first, pads with ones and stuffs zero
/// bytes after `0xFF`
fn pack(codes: &[(u16, u8)]) -> Vec<u8> {
    let mut bits = Vec::new();
    for (value, len) in codes {
        for i in (0..*len).rev() {
            bits.push((value >> i) & 1 == 1);
        }
    }
    while bits.len() % 8 != 0 {
        bits.push(true);
    }

    let mut out = Vec::new();
    for chunk in bits.chunks(8) {
        let byte = chunk.iter().fold(0_u8, |acc, bit| (acc << 1) | u8::from(*bit));
        out.push(byte);
        if byte == 0xFF {
            out.push(0x00);
        }
    }
    out
}

fn one_code(len: usize) -> [u8; 16] {
    let mut bits = [0; 16];
    bits[len - 1] = 1;
    bits
}

#[test]
fn oversized_dc_category() {
    let mut dqt = vec![0x00];
    dqt.extend_from_slice(&[1; 64]);

    // Code `0` maps to DC category 40
    let data = gray_jpeg(8, &dqt, one_code(1), &[40], &[0x00]);

    assert!(matches!(decode(&data), Err(Error::InvalidHuffmanCode)));
    assert!(matches!(thumbnail(&data, 1), Err(Error::InvalidHuffmanCode)));
}

#[test]
fn dc_prediction_overflow() {
    // 16 bit quantization table with the largest values
    let mut dqt = vec![0x10];
    dqt.extend_from_slice(&[0xFF; 128]);

    // Every block adds the largest difference of category 11, then ends
    let blocks: u16 = 20;
    let codes = (0..blocks)
        .flat_map(|_| [(0, 1), (0x7FF, 11), (0, 1)])
        .collect::<Vec<(u16, u8)>>();
    let data = gray_jpeg(blocks * 8, &dqt, one_code(1), &[11], &pack(&codes));

    assert!(matches!(decode(&data), Err(Error::CoefficientOverflow)));
}

#[test]
fn largest_dc_difference_decodes() {
    let mut dqt = vec![0x00];
    dqt.extend_from_slice(&[1; 64]);

    // +2047 followed by -2047 keeps the second block at zero
    let codes = [(0, 1), (0x7FF, 11), (0, 1), (0, 1), (0, 11), (0, 1)];
    let data = gray_jpeg(16, &dqt, one_code(1), &[11], &pack(&codes));

    let image = decode(&data).unwrap();
    let bytes = image.as_bytes().unwrap();
    assert_eq!(bytes[0], 255);
    assert_eq!(bytes[8], 128);
}

#[test]
fn dimensions_beyond_data() {
    let mut dqt = vec![0x00];
    dqt.extend_from_slice(&[1; 64]);

    let mut data = gray_jpeg(8, &dqt, one_code(1), &[0], &[0x00]);
    // Claim 65535x65535 pixels for a single byte of scan data
    let sof = data
        .windows(2)
        .position(|x| x == [0xFF, 0xC0])
        .unwrap();
    data[sof + 5..sof + 9].copy_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);

    assert!(matches!(
        decode(&data),
        Err(Error::InsufficientData { len: 1, .. })
    ));
}

#[test]
fn truncated_files_do_not_panic() {
    let data = encode(&solid(32, 16, [20, 140, 220]), &EncodeOptions::default()).unwrap();

    for len in 0..data.len() {
        let _ = decode(&data[..len]);
        let _ = thumbnail(&data[..len], 4);
    }
}

fn solid(width: u32, height: u32, rgb: [u8; 3]) -> ImageBuffer {
    let data = rgb.repeat((width * height) as usize);
    ImageBuffer::from_bytes(width, height, 3, data).unwrap()
}

#[test]
fn encoded_color_survives() {
    let image = solid(24, 16, [200, 100, 50]);
    let data = encode(&image, &EncodeOptions::default()).unwrap();
    assert!(Jpeg::is_filetype(&data));

    let decoded = decode(&data).unwrap();
    assert_eq!(decoded.width(), 24);
    assert_eq!(decoded.height(), 16);
    assert_eq!(decoded.channels(), 3);

    for (a, b) in decoded
        .as_bytes()
        .unwrap()
        .iter()
        .zip(image.as_bytes().unwrap())
    {
        assert!(a.abs_diff(*b) <= 6, "{a} != {b}");
    }
}

#[test]
fn encoded_gradient_survives() {
    let width = 40;
    let height = 24;
    let data = (0..height)
        .flat_map(|_| (0..width).map(|x| (x * 6) as u8))
        .collect::<Vec<_>>();
    let image = ImageBuffer::from_bytes(width, height, 1, data).unwrap();

    let options = EncodeOptions::default().with_quality(95);
    let decoded = decode(&encode(&image, &options).unwrap()).unwrap();
    assert_eq!(decoded.channels(), 1);

    let error = decoded
        .as_bytes()
        .unwrap()
        .iter()
        .zip(image.as_bytes().unwrap())
        .map(|(a, b)| u32::from(a.abs_diff(*b)))
        .sum::<u32>()
        / (width * height);
    assert!(error <= 3, "mean error {error}");
}

#[test]
fn alpha_is_dropped_on_encode() {
    let data = [10, 20, 30, 0].repeat(64);
    let image = ImageBuffer::from_bytes(8, 8, 4, data).unwrap();
    let decoded = decode(&encode(&image, &EncodeOptions::default()).unwrap()).unwrap();
    assert_eq!(decoded.channels(), 3);
}

#[test]
fn full_decode_thumbnail() {
    let image = solid(64, 48, [0, 0, 255]);
    let data = encode(&image, &EncodeOptions::default()).unwrap();

    // An eighth of the image is smaller than requested
    let thumbnail = thumbnail(&data, 32).unwrap();
    assert_eq!((thumbnail.full_width, thumbnail.full_height), (64, 48));
    assert_eq!(thumbnail.image.width(), 32);
    assert_eq!(thumbnail.image.height(), 24);

    // DC coefficients are enough
    let thumbnail = imbuf_jpeg::thumbnail(&data, 8).unwrap();
    assert_eq!(thumbnail.image.width(), 8);
    assert_eq!(thumbnail.image.height(), 6);
    let pixel = thumbnail.image.pixel_bytes(3, 3).unwrap();
    assert!(pixel[2] > 240 && pixel[0] < 15, "{pixel:?}");
}
