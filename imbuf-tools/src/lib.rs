//! Helpers shared by the imbuf command line tools

use tracing_subscriber::prelude::*;

/// Logs to stderr, filtered by `RUST_LOG`
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::builder().from_env_lossy())
        .with(
            tracing_subscriber::fmt::Layer::default()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Comma separated names of all set flags
pub fn flag_names(flags: imbuf::FormatFlags) -> String {
    let names: Vec<_> = flags.iter_names().collect();
    if names.is_empty() {
        String::from("–")
    } else {
        names.join(", ")
    }
}
