//! vf-components: electrical link models for nodal power-network simulation.
//!
//! Provides the multi-cell battery link and the boundary types it shares with
//! the external network solver:
//! - `BatteryCell`: per-cell electro-thermal state with the full malfunction
//!   matrix (open circuit, short circuit, capacity override, thermal runaway)
//! - `Battery`: N cells reduced to one Thevenin-equivalent link, with a
//!   time-staggered thermal-runaway cascade across cells
//! - `NetworkLink`: the trait the network solver drives once per step,
//!   `update_state` before the solve and `update_flux` after it
//!
//! All models are deterministic functions of state and parameters; identical
//! step sequences reproduce bit-identical outputs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vf_components::{Battery, BatteryConfig, BatteryInput, NetworkLink, Ports};
//! use vf_core::units::{ah, ohms};
//! use vf_core::NodeId;
//! use vf_volt::VocTable;
//!
//! let voc = Arc::new(VocTable::linear(0.0, 126.0).unwrap());
//! let cfg = BatteryConfig {
//!     num_cells: 10,
//!     cells_in_parallel: false,
//!     interconnect_resistance: ohms(0.01),
//!     cell_resistance: ohms(0.1),
//!     max_capacity: ah(320.0),
//! };
//! let input = BatteryInput { soc: 0.9, blockage: 0.0 };
//! let ports = Ports {
//!     negative: NodeId::from_index(0),
//!     positive: NodeId::from_index(1),
//! };
//!
//! let mut battery = Battery::new("main_bus".into(), &cfg, &input, voc, ports).unwrap();
//! let contribution = battery.update_state(0.1).unwrap();
//! println!(
//!     "G = {} S, Vs = {} V",
//!     contribution.conductance.value, contribution.source_voltage.value
//! );
//! ```

pub mod battery;
pub mod cell;
pub mod common;
pub mod error;
pub mod traits;

// Re-exports
pub use battery::{Battery, BatteryConfig, BatteryInput};
pub use cell::BatteryCell;
pub use error::{ComponentError, ComponentResult};
pub use traits::{LinkContribution, NetworkLink, Ports, SolvedLink};
