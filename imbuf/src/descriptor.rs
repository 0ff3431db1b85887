use std::fmt;
use std::path::Path;
use std::sync::Arc;

use imbuf_common::flags::{ColorRole, FormatFlags};
use imbuf_common::format_id::FormatId;
use imbuf_common::image::{ImageBuffer, Thumbnail};
use imbuf_common::options::EncodeOptions;

use crate::{Error, HookPhase};

/// Error type returned by codec functions and hooks
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type SniffFn = dyn Fn(&[u8]) -> bool + Send + Sync;
pub type DecodeFn = dyn Fn(&[u8]) -> Result<ImageBuffer, BoxError> + Send + Sync;
pub type EncodeFn =
    dyn Fn(&ImageBuffer, &EncodeOptions) -> Result<Vec<u8>, BoxError> + Send + Sync;
pub type ThumbnailFn = dyn Fn(&Path, u32) -> Result<Thumbnail, BoxError> + Send + Sync;
pub type HookFn = dyn Fn() -> Result<(), BoxError> + Send + Sync;

/// Everything the registry knows about one file type
///
/// Only sniffing and decoding are required. Further capabilities are added
/// with the `with_*` methods.
///
/// ```
/// use imbuf::{FormatDescriptor, FormatFlags, FormatId, ImageBuffer};
///
/// let format = FormatDescriptor::new(
///     FormatId::new(100).unwrap(),
///     "Gray bytes",
///     |data| data.starts_with(b"GRAY"),
///     |data| ImageBuffer::from_bytes(1, 1, 1, data[4..5].to_vec()),
/// )
/// .with_extensions(&["gray"])
/// .with_flags(FormatFlags::LOSSY);
///
/// assert!(format.sniff(b"GRAY\x80"));
/// let image = format.decode(b"GRAY\x80").unwrap();
/// assert_eq!(image.ftype(), Some(format.id()));
/// assert!(!format.has_encoder());
/// ```
#[derive(Clone)]
pub struct FormatDescriptor {
    id: FormatId,
    name: &'static str,
    extensions: &'static [&'static str],
    sniff: Arc<SniffFn>,
    decode: Arc<DecodeFn>,
    encode: Option<Arc<EncodeFn>>,
    decode_thumbnail: Option<Arc<ThumbnailFn>>,
    flags: FormatFlags,
    default_save_role: ColorRole,
    on_init: Option<Arc<HookFn>>,
    on_exit: Option<Arc<HookFn>>,
}

impl FormatDescriptor {
    pub fn new<S, D, E>(id: FormatId, name: &'static str, sniff: S, decode: D) -> Self
    where
        S: Fn(&[u8]) -> bool + Send + Sync + 'static,
        D: Fn(&[u8]) -> Result<ImageBuffer, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            id,
            name,
            extensions: &[],
            sniff: Arc::new(sniff),
            decode: Arc::new(move |data: &[u8]| -> Result<ImageBuffer, BoxError> {
                decode(data).map_err(Into::into)
            }),
            encode: None,
            decode_thumbnail: None,
            flags: FormatFlags::EMPTY,
            default_save_role: ColorRole::DefaultByte,
            on_init: None,
            on_exit: None,
        }
    }

    /// File name extensions without leading dot, the first one is preferred
    pub fn with_extensions(mut self, extensions: &'static [&'static str]) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_encoder<F, E>(mut self, encode: F) -> Self
    where
        F: Fn(&ImageBuffer, &EncodeOptions) -> Result<Vec<u8>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.encode = Some(Arc::new(
            move |image: &ImageBuffer, options: &EncodeOptions| -> Result<Vec<u8>, BoxError> {
                encode(image, options).map_err(Into::into)
            },
        ));
        self
    }

    /// Loader that creates thumbnails faster than a full decode
    pub fn with_thumbnail_loader<F, E>(mut self, decode_thumbnail: F) -> Self
    where
        F: Fn(&Path, u32) -> Result<Thumbnail, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.decode_thumbnail = Some(Arc::new(
            move |path: &Path, max_size: u32| -> Result<Thumbnail, BoxError> {
                decode_thumbnail(path, max_size).map_err(Into::into)
            },
        ));
        self
    }

    pub fn with_flags(mut self, flags: FormatFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_default_save_role(mut self, role: ColorRole) -> Self {
        self.default_save_role = role;
        self
    }

    /// Hook run by [`Registry::initialize_all`](crate::Registry::initialize_all)
    pub fn with_init<F, E>(mut self, on_init: F) -> Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.on_init = Some(hook(on_init));
        self
    }

    /// Hook run by [`Registry::shutdown_all`](crate::Registry::shutdown_all)
    pub fn with_exit<F, E>(mut self, on_exit: F) -> Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.on_exit = Some(hook(on_exit));
        self
    }

    pub fn id(&self) -> FormatId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    pub fn flags(&self) -> FormatFlags {
        self.flags
    }

    /// Pixel interpretation used on save if the options don't set one
    pub fn default_save_role(&self) -> ColorRole {
        self.default_save_role
    }

    pub fn has_encoder(&self) -> bool {
        self.encode.is_some()
    }

    pub fn has_thumbnail_loader(&self) -> bool {
        self.decode_thumbnail.is_some()
    }

    pub fn has_init(&self) -> bool {
        self.on_init.is_some()
    }

    pub fn has_exit(&self) -> bool {
        self.on_exit.is_some()
    }

    /// Whether `data` looks like this file type
    pub fn sniff(&self, data: &[u8]) -> bool {
        (self.sniff)(data)
    }

    /// Decodes `data` and tags the image with this format's id
    pub fn decode(&self, data: &[u8]) -> Result<ImageBuffer, Error> {
        let mut image = (self.decode)(data).map_err(|source| self.codec_error(source))?;
        image.set_ftype(Some(self.id));
        Ok(image)
    }

    /// Encodes `image` after converting it to the color role for saving
    ///
    /// The role is taken from `options` and falls back to
    /// [`default_save_role`](Self::default_save_role).
    pub fn encode(&self, image: &ImageBuffer, options: &EncodeOptions) -> Result<Vec<u8>, Error> {
        let encode = self.encode.as_ref().ok_or(Error::NoEncoder(self.id))?;

        let role = options.color_role.unwrap_or(self.default_save_role);
        let image = image.with_role(role);
        tracing::debug!("Encoding {} with color role {role:?}", self.name);

        encode(&*image, options).map_err(|source| self.codec_error(source))
    }

    /// Thumbnail of the file at `path` with no side longer than `max_size`
    ///
    /// Formats without a thumbnail loader decode the whole image and
    /// downscale it.
    pub fn thumbnail(&self, path: &Path, max_size: u32) -> Result<Thumbnail, Error> {
        let Some(decode_thumbnail) = &self.decode_thumbnail else {
            let data = std::fs::read(path)?;
            let image = self.decode(&data)?;
            return Ok(Thumbnail::from_image(image, max_size));
        };

        let mut thumbnail =
            decode_thumbnail(path, max_size).map_err(|source| self.codec_error(source))?;
        thumbnail.image.set_ftype(Some(self.id));
        Ok(thumbnail)
    }

    /// Runs the hook for `phase`, formats without a hook succeed
    pub(crate) fn run_hook(&self, phase: HookPhase) -> Result<(), Error> {
        let hook = match phase {
            HookPhase::Init => &self.on_init,
            HookPhase::Exit => &self.on_exit,
        };

        let Some(hook) = hook else {
            return Ok(());
        };

        tracing::debug!("Running {phase} hook of {}", self.name);
        hook().map_err(|source| Error::Hook {
            format: self.id,
            phase,
            source,
        })
    }

    fn codec_error(&self, source: BoxError) -> Error {
        Error::Codec {
            format: self.id,
            source,
        }
    }
}

fn hook<F, E>(f: F) -> Arc<HookFn>
where
    F: Fn() -> Result<(), E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    Arc::new(move || -> Result<(), BoxError> { f().map_err(Into::into) })
}

impl fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .field("flags", &self.flags)
            .field("default_save_role", &self.default_save_role)
            .field("encoder", &self.has_encoder())
            .field("thumbnail_loader", &self.has_thumbnail_loader())
            .field("init", &self.has_init())
            .field("exit", &self.has_exit())
            .finish()
    }
}
