//! Field descriptors and the generic field binder.
//!
//! Every entity declares a static list of [`FieldDescriptor`]s. Each one
//! names where a value lives in the container, whether it must be there,
//! and which typed field of the entity's draft receives it. [`bind_field`]
//! is the only place the required/optional policy is applied.

use crate::container::{Array, Container, Dataset, Scalar};
use crate::util::{Error, Result};

/// Where a field is read from, relative to the entity prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// Dataset node `/{prefix}{path}`.
    Dataset(&'static str),
    /// Attribute `name` on node `/{prefix}{path}`.
    Attribute(&'static str, &'static str),
}

/// Typed mutable reference to the destination field.
pub enum Slot<'a> {
    Array(&'a mut Option<Array>),
    Text(&'a mut Option<String>),
    Number(&'a mut Option<f64>),
}

/// Declarative description of one field of entity draft `T`.
pub struct FieldDescriptor<T> {
    pub source: Source,
    /// Name of the destination field, for diagnostics.
    pub destination: &'static str,
    pub required: bool,
    pub slot: fn(&mut T) -> Slot<'_>,
}

impl<T> FieldDescriptor<T> {
    pub const fn dataset(
        path: &'static str,
        destination: &'static str,
        required: bool,
        slot: fn(&mut T) -> Slot<'_>,
    ) -> Self {
        Self { source: Source::Dataset(path), destination, required, slot }
    }

    pub const fn attribute(
        path: &'static str,
        name: &'static str,
        destination: &'static str,
        required: bool,
        slot: fn(&mut T) -> Slot<'_>,
    ) -> Self {
        Self { source: Source::Attribute(path, name), destination, required, slot }
    }

    /// Full node path under `prefix`.
    pub fn node_path(&self, prefix: &str) -> String {
        let path = match self.source {
            Source::Dataset(p) | Source::Attribute(p, _) => p,
        };
        format!("/{}{}", prefix, path)
    }

    /// Node path plus `@Attribute` for attribute fields, as used in errors.
    pub fn location(&self, prefix: &str) -> String {
        match self.source {
            Source::Dataset(_) => self.node_path(prefix),
            Source::Attribute(_, name) => format!("{}@{}", self.node_path(prefix), name),
        }
    }
}

/// Result of binding a single field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindOutcome {
    Present,
    /// Optional field not in the container; the slot stays `None`.
    Absent,
}

enum Fetched {
    Dataset(Dataset),
    Scalar(Scalar),
}

impl Fetched {
    fn kind(&self) -> &'static str {
        match self {
            Self::Dataset(d) => d.kind(),
            Self::Scalar(s) => s.kind(),
        }
    }
}

/// Read one field from `container` into `target`.
///
/// A missing value fails with [`Error::RequiredFieldMissing`] when the
/// field is required and yields [`BindOutcome::Absent`] otherwise. Every
/// other container error is returned unchanged, whatever the policy.
pub fn bind_field<T>(
    target: &mut T,
    container: &dyn Container,
    prefix: &str,
    field: &FieldDescriptor<T>,
) -> Result<BindOutcome> {
    let node = field.node_path(prefix);
    let read = match field.source {
        Source::Dataset(_) => container.read_dataset(&node).map(Fetched::Dataset),
        Source::Attribute(_, name) => container.read_attribute(&node, name).map(Fetched::Scalar),
    };

    let value = match read {
        Ok(value) => value,
        Err(e) if e.is_missing() => {
            let location = field.location(prefix);
            if field.required {
                tracing::debug!(%location, "required field missing");
                return Err(Error::RequiredFieldMissing(location));
            }
            tracing::trace!(%location, "optional field absent");
            return Ok(BindOutcome::Absent);
        }
        Err(e) => return Err(e),
    };

    store((field.slot)(target), value, || field.location(prefix))?;
    tracing::trace!(location = %field.location(prefix), destination = field.destination, "bound");
    Ok(BindOutcome::Present)
}

/// Bind `fields` in order, stopping at the first error.
pub fn bind_all<T>(
    target: &mut T,
    container: &dyn Container,
    prefix: &str,
    fields: &[FieldDescriptor<T>],
) -> Result<()> {
    for field in fields {
        bind_field(target, container, prefix, field)?;
    }
    Ok(())
}

/// Unwrap a draft field that a required descriptor has bound.
pub(crate) fn take_required<T>(value: Option<T>, location: impl FnOnce() -> String) -> Result<T> {
    value.ok_or_else(|| Error::RequiredFieldMissing(location()))
}

fn store(slot: Slot<'_>, value: Fetched, location: impl Fn() -> String) -> Result<()> {
    let mismatch = |expected: &'static str, value: &Fetched| Error::TypeMismatch {
        path: location(),
        expected,
        actual: value.kind(),
    };

    match slot {
        Slot::Array(dst) => match value {
            Fetched::Dataset(Dataset::Numeric(a)) => *dst = Some(a),
            other => return Err(mismatch("numeric dataset", &other)),
        },
        Slot::Text(dst) => match value {
            Fetched::Dataset(Dataset::Text(s)) | Fetched::Scalar(Scalar::Text(s)) => *dst = Some(s),
            Fetched::Scalar(s) => *dst = Some(s.to_string()),
            other => return Err(mismatch("string", &other)),
        },
        Slot::Number(dst) => match value {
            Fetched::Dataset(Dataset::Numeric(ref a)) => match a.first() {
                Some(v) => *dst = Some(v),
                None => return Err(Error::invalid(format!("{}: empty dataset", location()))),
            },
            Fetched::Scalar(ref s) => match s.as_f64() {
                Some(v) => *dst = Some(v),
                None => return Err(mismatch("number", &value)),
            },
            other => return Err(mismatch("number", &other)),
        },
    }
    Ok(())
}
