//! Utility types shared across the crate.
//!
//! - [`Dimensions`] - array shapes
//! - [`Error`] / [`Result`] - error handling

mod error;
mod dimensions;

pub use error::*;
pub use dimensions::*;
