use std::sync::{Arc, Mutex};

use imbuf::*;

type Log = Arc<Mutex<Vec<String>>>;

fn id(value: u16) -> FormatId {
    FormatId::new(value).unwrap()
}

/// Format whose file content is its id as big endian bytes followed by one
/// gray pixel
fn format(value: u16) -> FormatDescriptor {
    FormatDescriptor::new(
        id(value),
        "test",
        move |data: &[u8]| data.starts_with(&value.to_be_bytes()),
        move |data: &[u8]| -> Result<ImageBuffer, BoxError> {
            let pixel = *data.get(2).ok_or("no pixel")?;
            Ok(ImageBuffer::from_bytes(1, 1, 1, vec![pixel])?)
        },
    )
}

/// Format with hooks that record their calls in `log`
fn logging_format(value: u16, log: &Log) -> FormatDescriptor {
    let init_log = log.clone();
    let exit_log = log.clone();
    format(value)
        .with_init(move || {
            init_log.lock().unwrap().push(format!("init {value}"));
            Ok::<_, BoxError>(())
        })
        .with_exit(move || {
            exit_log.lock().unwrap().push(format!("exit {value}"));
            Ok::<_, BoxError>(())
        })
}

fn failing_init(value: u16, log: &Log) -> FormatDescriptor {
    let log = log.clone();
    format(value).with_init(move || {
        log.lock().unwrap().push(format!("init {value}"));
        Err("init failed")
    })
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn lookup_by_id() {
    let registry = Registry::new(vec![format(10), format(20), format(30)]).unwrap();

    let format = registry.lookup(id(20)).unwrap();
    assert_eq!(format.id(), id(20));
    assert!(format.sniff(&[0, 20]));
    assert!(!format.sniff(&[0, 10]));
    assert_eq!(format.decode(&[0, 20, 7]).unwrap().as_bytes(), Some(&[7][..]));

    for value in [10, 20, 30] {
        assert_eq!(registry.lookup(id(value)).unwrap().id(), id(value));
    }
    assert!(registry.lookup(id(99)).is_none());
    assert_eq!(registry.len(), 3);
}

#[test]
fn lookup_by_image() {
    let registry = Registry::new(vec![format(10), format(20), format(30)]).unwrap();

    let image = registry.load(&[0, 30, 1]).unwrap();
    assert_eq!(image.ftype(), Some(id(30)));
    assert_eq!(registry.lookup_image(&image).unwrap().id(), id(30));

    let untagged = ImageBuffer::from_bytes(1, 1, 1, vec![0]).unwrap();
    assert!(registry.lookup_image(&untagged).is_none());

    let foreign = untagged.with_ftype(id(99));
    assert!(registry.lookup_image(&foreign).is_none());
}

#[test]
fn duplicate_ids() {
    let result = Registry::new(vec![format(10), format(20), format(10)]);
    assert!(matches!(result, Err(Error::DuplicateFormatId(x)) if x == id(10)));
}

#[test]
fn empty_registry() {
    let mut registry = Registry::new(Vec::new()).unwrap();
    assert!(registry.is_empty());
    assert!(registry.detect(b"anything").is_none());
    assert!(matches!(
        registry.load(b"anything"),
        Err(Error::NoSupportedFiletypeFound)
    ));

    registry.initialize_all().unwrap();
    registry.shutdown_all().unwrap();
}

#[test]
fn hooks_run_in_table_order() {
    let log = Log::default();
    let mut registry = Registry::new(vec![
        logging_format(30, &log),
        format(20),
        logging_format(10, &log),
    ])
    .unwrap();
    assert_eq!(registry.state(), State::Uninitialized);

    registry.initialize_all().unwrap();
    assert_eq!(registry.state(), State::Initialized);
    assert_eq!(entries(&log), ["init 30", "init 10"]);

    // Lookups work in every state
    assert!(registry.lookup(id(20)).is_some());

    registry.shutdown_all().unwrap();
    assert_eq!(registry.state(), State::ShutDown);
    assert_eq!(entries(&log), ["init 30", "init 10", "exit 30", "exit 10"]);
    assert!(registry.lookup(id(20)).is_some());
}

#[test]
fn lifecycle_misuse() {
    let log = Log::default();
    let mut registry = Registry::new(vec![logging_format(10, &log)]).unwrap();

    assert!(matches!(registry.shutdown_all(), Err(Error::NotInitialized)));
    assert!(entries(&log).is_empty());

    registry.initialize_all().unwrap();
    assert!(matches!(
        registry.initialize_all(),
        Err(Error::AlreadyInitialized)
    ));
    assert_eq!(entries(&log), ["init 10"]);

    registry.shutdown_all().unwrap();
    assert!(matches!(registry.shutdown_all(), Err(Error::NotInitialized)));
    assert!(matches!(
        registry.initialize_all(),
        Err(Error::AlreadyInitialized)
    ));
    assert_eq!(entries(&log), ["init 10", "exit 10"]);
}

#[test]
fn failing_init_rolls_back() {
    let log = Log::default();
    let mut registry = Registry::new(vec![
        logging_format(10, &log),
        failing_init(20, &log),
        logging_format(30, &log),
    ])
    .unwrap();

    let err = registry.initialize_all().unwrap_err();
    assert!(matches!(
        &err,
        Error::Hook { format, phase: HookPhase::Init, .. } if *format == id(20)
    ));
    assert_eq!(err.format(), Some(id(20)));
    assert!(err.to_string().contains("init failed"));

    assert_eq!(entries(&log), ["init 10", "init 20", "exit 10"]);
    assert_eq!(registry.state(), State::Uninitialized);
}

#[test]
fn failing_exit_runs_remaining_hooks() {
    let log = Log::default();
    let exit_log = log.clone();
    let mut registry = Registry::new(vec![
        format(10).with_exit(move || {
            exit_log.lock().unwrap().push("exit 10".to_string());
            Err("exit failed")
        }),
        logging_format(20, &log),
    ])
    .unwrap();

    registry.initialize_all().unwrap();
    let err = registry.shutdown_all().unwrap_err();

    assert!(matches!(
        err,
        Error::Hook { format, phase: HookPhase::Exit, .. } if format == id(10)
    ));
    assert_eq!(entries(&log), ["init 20", "exit 10", "exit 20"]);
    assert_eq!(registry.state(), State::ShutDown);
}

#[test]
fn codec_errors_name_the_format() {
    let registry = Registry::new(vec![format(10)]).unwrap();

    let err = registry.load(&[0, 10]).unwrap_err();
    assert!(matches!(err, Error::Codec { format, .. } if format == id(10)));

    let image = ImageBuffer::from_bytes(1, 1, 1, vec![0]).unwrap();
    assert!(matches!(
        registry.save(&image, id(10), &EncodeOptions::default()),
        Err(Error::NoEncoder(x)) if x == id(10)
    ));
    assert!(matches!(
        registry.save(&image, id(11), &EncodeOptions::default()),
        Err(Error::UnknownFormat(x)) if x == id(11)
    ));
}

#[test]
fn save_converts_to_color_role() {
    let roles = Arc::new(Mutex::new(Vec::new()));
    let seen = roles.clone();
    let registry = Registry::new(vec![format(10)
        .with_default_save_role(ColorRole::DefaultFloat)
        .with_encoder(move |image: &ImageBuffer, _: &EncodeOptions| {
            seen.lock().unwrap().push(image.pixels().role());
            Ok::<_, BoxError>(Vec::new())
        })])
    .unwrap();

    let image = ImageBuffer::from_bytes(1, 1, 1, vec![255]).unwrap();
    registry
        .save(&image, id(10), &EncodeOptions::default())
        .unwrap();
    registry
        .save(
            &image,
            id(10),
            &EncodeOptions::default().with_color_role(ColorRole::DefaultByte),
        )
        .unwrap();

    assert_eq!(
        *roles.lock().unwrap(),
        [ColorRole::DefaultFloat, ColorRole::DefaultByte]
    );
}

#[test]
fn detection_follows_table_order() {
    let greedy = FormatDescriptor::new(
        id(5),
        "greedy",
        |_: &[u8]| true,
        |_: &[u8]| ImageBuffer::from_bytes(1, 1, 1, vec![0]),
    );

    let registry = Registry::new(vec![format(10), greedy.clone()]).unwrap();
    assert_eq!(registry.detect(&[0, 10]).unwrap().id(), id(10));

    let registry = Registry::new(vec![greedy, format(10)]).unwrap();
    assert_eq!(registry.detect(&[0, 10]).unwrap().id(), id(5));
}
