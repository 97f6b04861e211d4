//! Values read out of a container: numeric arrays, string datasets and
//! scalar attributes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::Dimensions;

/// Dense numeric array in row-major order.
///
/// Every numeric SOFA variable is widened to `f64` on read, whatever its
/// storage type in the file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Array {
    shape: Dimensions,
    values: Vec<f64>,
}

impl Array {
    /// Create an array, checking that `values` fills `shape` exactly.
    pub fn new(shape: impl Into<Dimensions>, values: Vec<f64>) -> Option<Self> {
        let shape = shape.into();
        (shape.num_points() == Some(values.len())).then_some(Self { shape, values })
    }

    /// Rank-0 array holding one value.
    pub fn scalar(value: f64) -> Self {
        Self { shape: Dimensions::scalar(), values: vec![value] }
    }

    /// Rank-1 array over `values`.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self { shape: Dimensions::d1(values.len()), values }
    }

    pub fn shape(&self) -> &Dimensions {
        &self.shape
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Extent of the first dimension; 1 for a scalar.
    pub fn outer_len(&self) -> usize {
        self.shape.outer()
    }

    /// First stored value, if any.
    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    /// Iterate rows of a rank-2 array, e.g. `[M, 3]` positions.
    ///
    /// A rank-1 array is treated as a single row.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        let width = match self.shape.rank() {
            0 | 1 => self.values.len().max(1),
            _ => self.shape.sizes()[1..].iter().product::<usize>().max(1),
        };
        self.values.chunks(width)
    }
}

/// Content of a dataset node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dataset {
    Numeric(Array),
    Text(String),
}

impl Dataset {
    /// Kind name used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "numeric dataset",
            Self::Text(_) => "string dataset",
        }
    }
}

/// Attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
        }
    }

    /// Numeric view of the value; strings are not parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_shape_check() {
        assert!(Array::new((2, 3), vec![0.0; 6]).is_some());
        assert!(Array::new((2, 3), vec![0.0; 5]).is_none());
    }

    #[test]
    fn test_array_rows() {
        let a = Array::new((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let rows: Vec<&[f64]> = a.rows().collect();
        assert_eq!(rows, vec![&[1.0, 2.0, 3.0][..], &[4.0, 5.0, 6.0][..]]);
        assert_eq!(a.outer_len(), 2);

        let v = Array::from_vec(vec![7.0, 8.0, 9.0]);
        assert_eq!(v.rows().count(), 1);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from("SOFA").to_string(), "SOFA");
        assert_eq!(Scalar::Int(48000).to_string(), "48000");
        assert_eq!(Scalar::Int(3).as_f64(), Some(3.0));
        assert_eq!(Scalar::from("3").as_f64(), None);
    }
}
