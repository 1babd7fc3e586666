//! Core traits and boundary types for network link models.

use crate::error::ComponentResult;
use vf_core::NodeId;
use vf_core::units::{Conductance, Current, Voltage};

/// Node attachment for a two-port link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ports {
    /// Return/ground side of the link.
    pub negative: NodeId,
    /// Output terminal; telemetry voltage is read at this node.
    pub positive: NodeId,
}

/// Thevenin-equivalent contribution a link hands to the network solver
/// before each solve.
#[derive(Clone, Copy, Debug)]
pub struct LinkContribution {
    /// Equivalent conductance of the link (S).
    pub conductance: Conductance,
    /// Equivalent source voltage behind that conductance (V).
    pub source_voltage: Voltage,
    /// Pass-through blockage fraction from the base link, 0 (clear) to 1
    /// (fully blocked). The solver derates the admittance; the link does not.
    pub blockage: f64,
}

/// Converged solution the network solver hands back to a link after solving
/// the node potentials.
#[derive(Clone, Copy, Debug)]
pub struct SolvedLink {
    /// Signed current through the link (A). Positive discharges the source.
    pub flux: Current,
    /// Solved potentials at the negative and positive ports (V).
    pub port_potentials: [Voltage; 2],
}

/// Trait for link models driven by the external network solver.
///
/// The solver calls the two methods in strict sequence once per simulation
/// step: `update_state` before assembling the admittance matrix and
/// `update_flux` after the potential vector has converged. Links never solve
/// Kirchhoff's laws themselves; they only describe their own one-port
/// equivalent and absorb the solved current.
pub trait NetworkLink: Send + Sync {
    /// Link name for debugging and identification.
    fn name(&self) -> &str;

    /// Nodes this link spans.
    fn ports(&self) -> Ports;

    /// Advance internal state ahead of the solve and return this link's
    /// Thevenin-equivalent contribution for the admittance matrix.
    fn update_state(&mut self, dt: f64) -> ComponentResult<LinkContribution>;

    /// Absorb the converged solution: integrate internal state against the
    /// current the solver assigned to this link.
    fn update_flux(&mut self, dt: f64, solved: &SolvedLink) -> ComponentResult<()>;
}
