//! Typed entities hydrated from a container.
//!
//! - [`field`] - field descriptors and the generic binder
//! - [`GlobalAttributes`] - root metadata
//! - [`Geometry`] - listener, source, receiver and emitter
//! - [`Payload`] - measurement data, chosen by `DataType`

pub mod field;
mod attributes;
mod geometry;
mod payload;

pub use attributes::{GlobalAttributes, OPTIONAL_ATTRIBUTES, REQUIRED_ATTRIBUTES};
pub use field::{bind_all, bind_field, BindOutcome, FieldDescriptor, Slot, Source};
pub use geometry::{spherical_to_cartesian, CoordinateSystem, Geometry, Role};
pub use payload::{Fir, Payload, PayloadConstructor, PayloadRegistry};
