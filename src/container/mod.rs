//! Container access layer.
//!
//! A SOFA file is a flat netCDF-4 namespace: global attributes live on the
//! root node `/`, every variable is a dataset node such as
//! `/ListenerPosition` or `/Data.IR` carrying its own attributes. This module
//! defines the narrow interface the schema layer reads through, plus the
//! concrete backends:
//! - [`MemoryContainer`] - in-memory node tree, also the decode target of
//!   the file backends
//! - [`JsonContainer`] - SOFA JSON dumps, plain or gzip-compressed
//! - `Hdf5Container` - `.sofa` netCDF-4/HDF5 files (feature `hdf5`)

mod value;
mod memory;
mod json;
#[cfg(feature = "hdf5")]
mod hdf;

pub use value::{Array, Dataset, Scalar};
pub use memory::{MemoryContainer, Node};
pub use json::JsonContainer;
#[cfg(feature = "hdf5")]
pub use hdf::Hdf5Container;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::util::{Error, Result};

/// Path of the root node holding the global attributes.
pub const ROOT: &str = "/";

/// HDF5 superblock signature.
pub const HDF5_MAGIC: &[u8; 8] = b"\x89HDF\r\n\x1a\n";

/// gzip member header.
pub const GZIP_MAGIC: &[u8; 2] = b"\x1f\x8b";

/// Read interface over an open hierarchical container.
///
/// Implementations report absent nodes as [`Error::NodeMissing`] and absent
/// attributes as [`Error::AttributeMissing`]; any other error is treated as
/// a broken container by the schema layer.
pub trait Container: Send + Sync {
    /// Source name (usually the file path).
    fn name(&self) -> &str;

    /// Read the payload of the dataset at `path`.
    fn read_dataset(&self, path: &str) -> Result<Dataset>;

    /// Read attribute `name` attached to the node at `path`.
    fn read_attribute(&self, path: &str, name: &str) -> Result<Scalar>;

    /// Release underlying resources. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;

    /// False once [`Container::close`] has been called.
    fn is_open(&self) -> bool;
}

/// Opens containers from filesystem paths.
pub trait Opener {
    fn open(&self, path: &Path) -> Result<Box<dyn Container>>;
}

/// Storage backend selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// Detect from the leading magic bytes.
    #[default]
    Auto,
    /// SOFA JSON dump (plain or gzip).
    Json,
    /// netCDF-4/HDF5.
    Hdf5,
}

impl Backend {
    /// Detect the backend from the first bytes of a file.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(HDF5_MAGIC) {
            Self::Hdf5
        } else {
            Self::Json
        }
    }
}

/// Options controlling how a file is opened.
#[derive(Clone, Debug)]
pub struct OpenOptions {
    pub backend: Backend,
    /// Memory-map files instead of reading them into a buffer.
    pub use_mmap: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { backend: Backend::Auto, use_mmap: true }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn use_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }
}

/// Default [`Opener`]: dispatches on [`OpenOptions::backend`].
#[derive(Clone, Debug, Default)]
pub struct FileOpener {
    pub options: OpenOptions,
}

impl FileOpener {
    pub fn new(options: OpenOptions) -> Self {
        Self { options }
    }
}

impl Opener for FileOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn Container>> {
        let backend = match self.options.backend {
            Backend::Auto => Backend::detect(&read_head(path)?),
            forced => forced,
        };
        tracing::debug!(path = %path.display(), ?backend, "opening container");

        match backend {
            Backend::Hdf5 => open_hdf5(path),
            _ => Ok(Box::new(JsonContainer::open_opts(path, self.options.use_mmap)?)),
        }
    }
}

#[cfg(feature = "hdf5")]
fn open_hdf5(path: &Path) -> Result<Box<dyn Container>> {
    Ok(Box::new(Hdf5Container::open(path)?))
}

#[cfg(not(feature = "hdf5"))]
fn open_hdf5(path: &Path) -> Result<Box<dyn Container>> {
    Err(Error::other(format!(
        "{} is an HDF5 file; rebuild with `--features hdf5` to read it",
        path.display()
    )))
}

/// Open a file, mapping a missing file to [`Error::FileNotFound`].
pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })
}

fn read_head(path: &Path) -> Result<Vec<u8>> {
    let mut head = Vec::with_capacity(HDF5_MAGIC.len());
    open_file(path)?
        .take(HDF5_MAGIC.len() as u64)
        .read_to_end(&mut head)?;
    Ok(head)
}

/// Join a node name onto a group path: `join("/", "Data.IR") == "/Data.IR"`.
pub fn join(group: &str, name: &str) -> String {
    if group.ends_with('/') {
        format!("{}{}", group, name)
    } else {
        format!("{}/{}", group, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(Backend::detect(b"\x89HDF\r\n\x1a\n\0\0"), Backend::Hdf5);
        assert_eq!(Backend::detect(b"{\"attr"), Backend::Json);
        assert_eq!(Backend::detect(b"\x1f\x8b\x08"), Backend::Json);
        assert_eq!(Backend::detect(b""), Backend::Json);
    }

    #[test]
    fn test_join() {
        assert_eq!(join(ROOT, "ListenerPosition"), "/ListenerPosition");
        assert_eq!(join("/Data", "IR"), "/Data/IR");
    }

    #[test]
    fn test_open_missing_file() {
        let err = FileOpener::default()
            .open(Path::new("/definitely/not/here.sofa"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[cfg(not(feature = "hdf5"))]
    #[test]
    fn test_hdf5_without_feature() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HDF5_MAGIC).unwrap();
        let err = FileOpener::default().open(file.path()).err().unwrap();
        assert!(err.to_string().contains("--features hdf5"));
        assert!(!err.is_missing());
    }
}
