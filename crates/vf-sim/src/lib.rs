//! vf-sim: step sequencing for network link models.
//!
//! The host environment owns the admittance-matrix solver; this crate owns
//! the per-tick choreography around it: `update_state` before the solve,
//! `update_flux` after it, in strict order, deterministically. The
//! `BusSolver` trait is the injection seam for the real solver; the
//! `FixedLoadBus` closed-form solve stands in for it in tests and demos.

pub mod bus;
pub mod error;
pub mod sim;

// Re-exports
pub use bus::{BusSolver, FixedLoadBus};
pub use error::{SimError, SimResult};
pub use sim::{SimOptions, SimRecord, run_sim};
