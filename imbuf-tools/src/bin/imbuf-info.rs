use std::path::Path;
use std::process::ExitCode;

use imbuf::{Pixels, Registry};

/// Bytes of the file start that are shown
const HEAD_LEN: usize = 16;

fn main() -> ExitCode {
    imbuf_tools::init_logging();

    let paths: Vec<_> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: imbuf-info <file>...");
        return ExitCode::FAILURE;
    }

    let mut registry = Registry::builtin();
    if let Err(err) = registry.initialize_all() {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let mut status = ExitCode::SUCCESS;
    for path in &paths {
        if let Err(err) = show(&registry, Path::new(path)) {
            eprintln!("{path}: {err}");
            status = ExitCode::FAILURE;
        }
    }

    if let Err(err) = registry.shutdown_all() {
        eprintln!("{err}");
        status = ExitCode::FAILURE;
    }

    status
}

fn show(registry: &Registry, path: &Path) -> Result<(), imbuf::Error> {
    let data = std::fs::read(path)?;

    println!("{}", path.display());
    println!(
        "  First bytes:\t{}",
        hex::encode(&data[..data.len().min(HEAD_LEN)])
    );

    let format = registry
        .detect(&data)
        .ok_or(imbuf::Error::NoSupportedFiletypeFound)?;
    println!("  Format:\t{} (id {})", format.name(), format.id().get());
    println!("  Flags:\t{}", imbuf_tools::flag_names(format.flags()));

    let image = format.decode(&data)?;
    let kind = match image.pixels() {
        Pixels::Byte(_) => "8 bit",
        Pixels::Float(_) => "float",
    };
    println!("  Dimensions:\t{}x{}", image.width(), image.height());
    println!("  Channels:\t{} ({kind})", image.channels());

    Ok(())
}
