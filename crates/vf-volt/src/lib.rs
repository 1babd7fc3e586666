//! vf-volt: open-circuit-voltage lookup for battery models.
//!
//! A battery model maps state of charge to open-circuit voltage through a
//! monotonic table. The table is owned by the host environment and shared
//! read-only with every cell that consumes it; evaluation is deterministic and
//! side-effect-free, so one table can back an entire pack.

pub mod error;
pub mod table;

// Re-exports
pub use error::{VoltError, VoltResult};
pub use table::{VocCurve, VocTable};
