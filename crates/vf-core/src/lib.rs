//! vf-core: stable foundation for voltflow.
//!
//! Contains:
//! - units (uom SI electrical types + constructors)
//! - numeric (Real + float guards used by every model)
//! - ids (stable compact IDs for network nodes/links/ports)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{VfError, VfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
