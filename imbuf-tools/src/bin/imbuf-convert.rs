use std::process::ExitCode;

use imbuf::{ColorRole, EncodeOptions, Registry};

const USAGE: &str = "Usage: imbuf-convert <input> <output> [--quality <1-100>] \
                     [--compression <0-100>] [--no-rle] [--float]";

struct Args {
    input: String,
    output: String,
    options: EncodeOptions,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut files = Vec::new();
    let mut options = EncodeOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--quality" => options = options.with_quality(number(&arg, args.next())?),
            "--compression" => options = options.with_compression(number(&arg, args.next())?),
            "--no-rle" => options = options.with_rle(false),
            "--float" => options = options.with_color_role(ColorRole::DefaultFloat),
            flag if flag.starts_with("--") => return Err(format!("Unknown option {flag}")),
            _ => files.push(arg),
        }
    }

    match <[String; 2]>::try_from(files) {
        Ok([input, output]) => Ok(Args {
            input,
            output,
            options,
        }),
        Err(_) => Err(USAGE.to_string()),
    }
}

fn number(flag: &str, value: Option<String>) -> Result<u8, String> {
    value
        .and_then(|x| x.parse().ok())
        .ok_or_else(|| format!("{flag} requires a number from 0 to 100"))
}

fn main() -> ExitCode {
    imbuf_tools::init_logging();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut registry = Registry::builtin();
    let result = registry.initialize_all().and_then(|()| {
        let image = registry.load_path(&args.input)?;
        tracing::info!(
            "Loaded {}x{} image from {}",
            image.width(),
            image.height(),
            args.input
        );
        registry.save_path(&image, &args.output, None, &args.options)
    });

    if registry.state() == imbuf::State::Initialized {
        if let Err(err) = registry.shutdown_all() {
            eprintln!("{err}");
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
