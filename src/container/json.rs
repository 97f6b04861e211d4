//! SOFA JSON dump backend.
//!
//! Layout of a dump (optionally gzip-compressed):
//!
//! ```text
//! {
//!   "attributes": { "Conventions": "SOFA", "DataType": "FIR", ... },
//!   "dimensions": { "M": 2, "R": 2, "N": 8, ... },
//!   "variables": {
//!     "ListenerPosition": {
//!       "attributes": { "Type": "cartesian", "Units": "metre" },
//!       "shape": [1, 3],
//!       "data": [0, 0, 0]
//!     },
//!     "ListenerDescription": { "data": "KEMAR" }
//!   }
//! }
//! ```
//!
//! `data` may be a string, a number, or a (nested) array of numbers. When
//! `shape` is omitted it is inferred from the nesting. `dimensions` is
//! informational and not checked.
//!
//! Attributes are strings or numbers. A flat array of strings or numbers is
//! kept as comma-separated text; any other attribute value is skipped.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use memmap2::Mmap;
use serde::Deserialize;
use serde_json::Value;

use super::{join, open_file, Array, Container, Dataset, MemoryContainer, Scalar, GZIP_MAGIC, ROOT};
use crate::util::{Dimensions, Error, Result};

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
    #[serde(default)]
    variables: BTreeMap<String, Variable>,
}

#[derive(Deserialize)]
struct Variable {
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
    #[serde(default)]
    shape: Option<Vec<usize>>,
    data: Value,
}

/// Container decoded from a SOFA JSON dump.
#[derive(Clone, Debug)]
pub struct JsonContainer {
    inner: MemoryContainer,
}

impl JsonContainer {
    /// Open a dump with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a dump with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut file = open_file(path)?;
        let size = file.metadata()?.len();
        let name = path.display().to_string();

        if use_mmap && size > 0 {
            // Safety: mapped read-only and dropped before returning
            let mmap = unsafe { Mmap::map(&file) }?;
            Self::from_slice(name, &mmap)
        } else {
            let mut bytes = Vec::with_capacity(size as usize);
            file.read_to_end(&mut bytes)?;
            Self::from_slice(name, &bytes)
        }
    }

    /// Decode a dump held in memory. gzip input is detected and inflated.
    pub fn from_slice(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let doc: Document = if bytes.starts_with(GZIP_MAGIC) {
            let mut inflated = Vec::new();
            GzDecoder::new(bytes).read_to_end(&mut inflated)?;
            serde_json::from_slice(&inflated)?
        } else {
            serde_json::from_slice(bytes)?
        };
        let inner = build(MemoryContainer::new(name), doc)?;
        Ok(Self { inner })
    }

    /// The decoded node tree.
    pub fn into_inner(self) -> MemoryContainer {
        self.inner
    }
}

fn build(mut container: MemoryContainer, doc: Document) -> Result<MemoryContainer> {
    for (name, value) in &doc.attributes {
        if let Some(value) = scalar(ROOT, name, value)? {
            container.set_attribute(ROOT, name, value);
        }
    }

    for (var_name, var) in doc.variables {
        let path = join(ROOT, &var_name);
        container.set_dataset(&path, dataset(&path, var.shape, &var.data)?);
        for (name, value) in &var.attributes {
            if let Some(value) = scalar(&path, name, value)? {
                container.set_attribute(&path, name, value);
            }
        }
    }
    tracing::trace!(nodes = container.nodes().count(), "decoded JSON container");
    Ok(container)
}

fn scalar(path: &str, name: &str, value: &Value) -> Result<Option<Scalar>> {
    match value {
        Value::String(s) => Ok(Some(Scalar::Text(s.clone()))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Some(Scalar::Int(i))),
            None => n
                .as_f64()
                .map(|v| Some(Scalar::Float(v)))
                .ok_or_else(|| Error::invalid(format!("{}@{}: number out of range", path, name))),
        },
        Value::Array(items) => {
            let parts: Option<Vec<String>> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            match parts {
                Some(parts) => Ok(Some(Scalar::Text(parts.join(", ")))),
                None => {
                    tracing::debug!(path, name, "skipping nested array attribute");
                    Ok(None)
                }
            }
        }
        _ => {
            tracing::debug!(path, name, "skipping attribute that is not a string or number");
            Ok(None)
        }
    }
}

fn dataset(path: &str, shape: Option<Vec<usize>>, data: &Value) -> Result<Dataset> {
    if let Value::String(s) = data {
        return Ok(Dataset::Text(s.clone()));
    }

    let mut values = Vec::new();
    let inferred = flatten(path, data, &mut values)?;
    let shape = shape.map(Dimensions::from).unwrap_or(inferred);
    Array::new(shape.clone(), values)
        .map(Dataset::Numeric)
        .ok_or_else(|| Error::invalid(format!("{}: data does not fill shape {}", path, shape)))
}

/// Flatten nested arrays in row-major order, returning the inferred shape.
fn flatten(path: &str, value: &Value, out: &mut Vec<f64>) -> Result<Dimensions> {
    match value {
        Value::Number(n) => {
            let v = n
                .as_f64()
                .ok_or_else(|| Error::invalid(format!("{}: number out of range", path)))?;
            out.push(v);
            Ok(Dimensions::scalar())
        }
        Value::Array(items) => {
            let mut inner: Option<Dimensions> = None;
            for item in items {
                let dims = flatten(path, item, out)?;
                match &inner {
                    Some(prev) if *prev != dims => {
                        return Err(Error::invalid(format!("{}: ragged array", path)));
                    }
                    Some(_) => {}
                    None => inner = Some(dims),
                }
            }
            let mut sizes = vec![items.len()];
            sizes.extend_from_slice(inner.unwrap_or_default().sizes());
            Ok(Dimensions::from(sizes))
        }
        _ => Err(Error::invalid(format!("{}: data must be numeric", path))),
    }
}

impl Container for JsonContainer {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn read_dataset(&self, path: &str) -> Result<Dataset> {
        self.inner.read_dataset(path)
    }

    fn read_attribute(&self, path: &str, name: &str) -> Result<Scalar> {
        self.inner.read_attribute(path, name)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }
}
