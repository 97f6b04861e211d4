//! # SOFA
//!
//! Reader for SOFA (Spatially Oriented Format for Acoustics, AES69) files.
//!
//! A SOFA file is a netCDF-4 container of named arrays and attributes that
//! describes an acoustic measurement: where the listener, sources, receivers
//! and emitters were, and the impulse responses measured between them. This
//! crate reads such a file into a validated, strongly-typed [`Sofa`] value.
//!
//! ## Modules
//!
//! - [`util`] - Shapes and errors
//! - [`container`] - Container access trait and backends (memory, JSON, HDF5)
//! - [`schema`] - Field descriptors, binder and typed entities
//! - [`sofa`] - The root aggregate
//!
//! ## Example
//!
//! ```ignore
//! use sofa::Sofa;
//!
//! let sofa = Sofa::open("subject_003.sofa")?;
//! let fir = sofa.fir().expect("FIR data");
//! println!("{} receivers @ {} Hz", fir.num_receivers(), fir.sampling_rate());
//! ```

pub mod util;
pub mod container;
pub mod schema;
pub mod sofa;

// Re-export commonly used types
pub use util::{Error, Result};
pub use sofa::Sofa;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Dimensions, Error, Result};
    pub use crate::container::{
        Array, Backend, Container, Dataset, JsonContainer, MemoryContainer, OpenOptions, Scalar,
    };
    pub use crate::schema::{Fir, Geometry, GlobalAttributes, Payload, PayloadRegistry, Role};
    pub use crate::sofa::Sofa;
}
