use imbuf::Registry;

fn main() {
    imbuf_tools::init_logging();

    let registry = Registry::builtin();

    println!("Id\tName\t\tExtensions\t\tFlags\tSave role\tThumbnails");
    for format in &registry {
        println!(
            "{}\t{:<12}\t{:<20}\t{}\t{:?}\t{}",
            format.id().get(),
            format.name(),
            format.extensions().join(", "),
            imbuf_tools::flag_names(format.flags()),
            format.default_save_role(),
            if format.has_thumbnail_loader() {
                "fast"
            } else {
                "decode"
            },
        );
    }
}
