use std::io::Read;
use std::path::Path;

use imbuf_common::format_id::FormatId;
use imbuf_common::image::{ImageBuffer, Thumbnail};
use imbuf_common::options::EncodeOptions;

use crate::{Error, FormatDescriptor, HookPhase};

/// Bytes read from the start of a file to detect its type
const SNIFF_LEN: u64 = 4096;

/// Lifecycle of the formats in a [`Registry`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Uninitialized,
    Initialized,
    ShutDown,
}

/// Ordered table of file types
///
/// The table can't be changed after construction. Lookups and detection
/// follow table order and work in every [`State`].
#[derive(Debug)]
pub struct Registry {
    formats: Vec<FormatDescriptor>,
    state: State,
}

static_assertions::assert_impl_all!(Registry: Send, Sync);
static_assertions::assert_impl_all!(FormatDescriptor: Send, Sync, Clone);

impl Registry {
    /// Registry with the given formats in table order
    ///
    /// Fails if an id is used more than once.
    pub fn new(formats: Vec<FormatDescriptor>) -> Result<Self, Error> {
        for (i, format) in formats.iter().enumerate() {
            if formats[..i].iter().any(|x| x.id() == format.id()) {
                return Err(Error::DuplicateFormatId(format.id()));
            }
        }

        Ok(Self {
            formats,
            state: State::Uninitialized,
        })
    }

    /// Registry with all formats enabled via cargo features
    ///
    /// The order is JPEG, PNG, BMP, TGA, Radiance HDR.
    pub fn builtin() -> Self {
        Self {
            formats: crate::builtin::formats(),
            state: State::Uninitialized,
        }
    }

    pub fn formats(&self) -> &[FormatDescriptor] {
        &self.formats
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormatDescriptor> {
        self.formats.iter()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Descriptor with the id `id`
    pub fn lookup(&self, id: FormatId) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|x| x.id() == id)
    }

    /// Descriptor of the file type the image was decoded from
    pub fn lookup_image(&self, image: &ImageBuffer) -> Option<&FormatDescriptor> {
        self.lookup(image.ftype()?)
    }

    /// Descriptor for a file name extension
    ///
    /// ```
    /// # use imbuf::{FormatId, Registry};
    /// let registry = Registry::builtin();
    /// assert_eq!(registry.lookup_extension(".JPG").unwrap().id(), FormatId::JPEG);
    /// assert!(registry.lookup_extension("xcf").is_none());
    /// ```
    pub fn lookup_extension(&self, extension: &str) -> Option<&FormatDescriptor> {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        self.formats.iter().find(|format| {
            format
                .extensions()
                .iter()
                .any(|x| x.eq_ignore_ascii_case(extension))
        })
    }

    /// First descriptor that recognizes `data`
    pub fn detect(&self, data: &[u8]) -> Option<&FormatDescriptor> {
        let format = self.formats.iter().find(|x| x.sniff(data));
        match format {
            Some(format) => tracing::debug!("Detected {}", format.name()),
            None => tracing::debug!("No format detected for {} bytes", data.len()),
        }
        format
    }

    /// Decodes an image of any registered file type
    pub fn load(&self, data: &[u8]) -> Result<ImageBuffer, Error> {
        self.detect(data)
            .ok_or(Error::NoSupportedFiletypeFound)?
            .decode(data)
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<ImageBuffer, Error> {
        let data = std::fs::read(path)?;
        self.load(&data)
    }

    /// Encodes `image` as file type `format`
    pub fn save(
        &self,
        image: &ImageBuffer,
        format: FormatId,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, Error> {
        self.lookup(format)
            .ok_or(Error::UnknownFormat(format))?
            .encode(image, options)
    }

    /// Writes `image` to `path`
    ///
    /// Without `format`, the file type is chosen by the extension of `path`.
    pub fn save_path(
        &self,
        image: &ImageBuffer,
        path: impl AsRef<Path>,
        format: Option<FormatId>,
        options: &EncodeOptions,
    ) -> Result<(), Error> {
        let path = path.as_ref();

        let descriptor = match format {
            Some(format) => self.lookup(format).ok_or(Error::UnknownFormat(format))?,
            None => {
                let extension = path
                    .extension()
                    .map(|x| x.to_string_lossy())
                    .unwrap_or_default();
                self.lookup_extension(&extension)
                    .ok_or_else(|| Error::UnknownExtension(extension.to_string()))?
            }
        };

        let data = descriptor.encode(image, options)?;
        std::fs::write(path, data)?;

        Ok(())
    }

    /// Thumbnail with no side longer than `max_size`
    ///
    /// The file type is detected from the start of the file.
    pub fn load_thumbnail(&self, path: impl AsRef<Path>, max_size: u32) -> Result<Thumbnail, Error> {
        let path = path.as_ref();

        let mut head = Vec::new();
        std::fs::File::open(path)?
            .take(SNIFF_LEN)
            .read_to_end(&mut head)?;

        self.detect(&head)
            .ok_or(Error::NoSupportedFiletypeFound)?
            .thumbnail(path, max_size)
    }

    /// Runs the init hooks of all formats in table order
    ///
    /// If a hook fails, the exit hooks of the formats before it are run and
    /// the registry stays uninitialized.
    pub fn initialize_all(&mut self) -> Result<(), Error> {
        if self.state != State::Uninitialized {
            return Err(Error::AlreadyInitialized);
        }

        for (i, format) in self.formats.iter().enumerate() {
            if let Err(err) = format.run_hook(HookPhase::Init) {
                tracing::warn!("{err}");

                for format in &self.formats[..i] {
                    if let Err(err) = format.run_hook(HookPhase::Exit) {
                        tracing::warn!("While rolling back: {err}");
                    }
                }

                return Err(err);
            }
        }

        self.state = State::Initialized;
        tracing::info!("Initialized {} formats", self.formats.len());

        Ok(())
    }

    /// Runs the exit hooks of all formats in table order
    ///
    /// All hooks are run even if one fails. The first failure is returned.
    pub fn shutdown_all(&mut self) -> Result<(), Error> {
        if self.state != State::Initialized {
            return Err(Error::NotInitialized);
        }

        let mut result = Ok(());
        for format in &self.formats {
            if let Err(err) = format.run_hook(HookPhase::Exit) {
                tracing::warn!("{err}");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        self.state = State::ShutDown;
        tracing::info!("Shut down {} formats", self.formats.len());

        result
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if self.state == State::Initialized {
            tracing::warn!("Registry dropped without shutting down its formats");
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a FormatDescriptor;
    type IntoIter = std::slice::Iter<'a, FormatDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.formats.iter()
    }
}
