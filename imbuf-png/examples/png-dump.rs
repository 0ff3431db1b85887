use imbuf_png::{ChunkType, Png};

fn main() {
    let path = std::env::args().nth(1).expect("Usage: png-dump <file>");
    let data = std::fs::read(path).unwrap();
    let png = Png::new(&data).unwrap();

    let header = png.header().unwrap();
    println!(
        "{}x{} {:?} {} bit{}",
        header.width,
        header.height,
        header.color_type,
        header.bit_depth,
        if header.interlaced { ", Adam7" } else { "" }
    );

    for chunk in png.chunks() {
        let len = chunk.chunk_data().len();
        match chunk.chunk_type() {
            ChunkType::tEXt => {
                let (keyword, text) = chunk.text().unwrap();
                println!(
                    "tEXt {}: {}",
                    String::from_utf8_lossy(keyword),
                    String::from_utf8_lossy(text)
                );
            }
            chunk_type if chunk_type.is_critical() => println!("{chunk_type:?} {len} bytes"),
            chunk_type => println!("{chunk_type:?} {len} bytes (ancillary)"),
        }
    }
}
