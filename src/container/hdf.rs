//! netCDF-4/HDF5 backend.
//!
//! SOFA files are netCDF-4 files, i.e. HDF5 files whose variables are
//! datasets directly under the root group. Existence of links and
//! attributes is checked before each read so that an absent field is
//! reported as missing rather than as an opaque library error.

use std::path::Path;

use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};

use super::{Array, Container, Dataset, Scalar};
use crate::util::{Dimensions, Error, Result};

/// Longest fixed-length string element read from a file. Longer elements
/// are rejected with `InvalidStructure` instead of being truncated.
const MAX_FIXED_STR: usize = 4096;

/// Container over an open HDF5 file.
pub struct Hdf5Container {
    name: String,
    file: Option<hdf5::File>,
}

impl Hdf5Container {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let file = hdf5::File::open(path)?;
        Ok(Self { name: path.display().to_string(), file: Some(file) })
    }

    fn file(&self) -> Result<&hdf5::File> {
        self.file.as_ref().ok_or(Error::Closed)
    }
}

fn relative(path: &str) -> &str {
    path.trim_start_matches('/')
}

fn read_strings(data: &hdf5::Container, desc: &TypeDescriptor, location: &str) -> Result<Option<String>> {
    if let TypeDescriptor::FixedAscii(len) | TypeDescriptor::FixedUnicode(len) = desc {
        if *len > MAX_FIXED_STR {
            return Err(Error::invalid(format!(
                "{}: fixed-length string of {} bytes exceeds {}",
                location, len, MAX_FIXED_STR
            )));
        }
    }
    let parts: Vec<String> = match desc {
        TypeDescriptor::VarLenUnicode => data
            .read_raw::<VarLenUnicode>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        TypeDescriptor::VarLenAscii => data
            .read_raw::<VarLenAscii>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        TypeDescriptor::FixedAscii(_) => data
            .read_raw::<FixedAscii<MAX_FIXED_STR>>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        TypeDescriptor::FixedUnicode(_) => data
            .read_raw::<FixedUnicode<MAX_FIXED_STR>>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        _ => return Ok(None),
    };
    // netCDF char variables arrive as one element per character
    Ok(Some(parts.concat().trim_end_matches('\0').to_string()))
}

fn is_numeric(desc: &TypeDescriptor) -> bool {
    matches!(
        desc,
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) | TypeDescriptor::Float(_)
    )
}

impl Container for Hdf5Container {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_dataset(&self, path: &str) -> Result<Dataset> {
        let file = self.file()?;
        let rel = relative(path);
        if rel.is_empty() || !file.link_exists(rel) {
            return Err(Error::NodeMissing(path.to_string()));
        }
        let ds = file.dataset(rel)?;
        let desc = ds.dtype()?.to_descriptor()?;

        if is_numeric(&desc) {
            let values = ds.read_raw::<f64>()?;
            let shape = Dimensions::from(ds.shape());
            return Array::new(shape, values)
                .map(Dataset::Numeric)
                .ok_or_else(|| Error::invalid(format!("{}: size does not match shape", path)));
        }
        match read_strings(&ds, &desc, path)? {
            Some(text) => Ok(Dataset::Text(text)),
            None => Err(Error::TypeMismatch {
                path: path.to_string(),
                expected: "numeric or string dataset",
                actual: "compound or opaque dataset",
            }),
        }
    }

    fn read_attribute(&self, path: &str, name: &str) -> Result<Scalar> {
        let file = self.file()?;
        let rel = relative(path);
        let missing = || Error::attribute_missing(path, name);

        let attr = if rel.is_empty() {
            if !file.attr_names()?.iter().any(|n| n == name) {
                return Err(missing());
            }
            file.attr(name)?
        } else {
            if !file.link_exists(rel) {
                return Err(missing());
            }
            let ds = file.dataset(rel)?;
            if !ds.attr_names()?.iter().any(|n| n == name) {
                return Err(missing());
            }
            ds.attr(name)?
        };

        let desc = attr.dtype()?.to_descriptor()?;
        match desc {
            TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => attr
                .read_raw::<i64>()?
                .first()
                .map(|v| Scalar::Int(*v))
                .ok_or_else(|| Error::invalid(format!("{}@{}: empty attribute", path, name))),
            TypeDescriptor::Float(_) => attr
                .read_raw::<f64>()?
                .first()
                .map(|v| Scalar::Float(*v))
                .ok_or_else(|| Error::invalid(format!("{}@{}: empty attribute", path, name))),
            other => read_strings(&attr, &other, &format!("{}@{}", path, name))?
                .map(Scalar::Text)
                .ok_or_else(|| Error::TypeMismatch {
                    path: format!("{}@{}", path, name),
                    expected: "string or number",
                    actual: "compound or opaque attribute",
                }),
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.close()?;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }
}
