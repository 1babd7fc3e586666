//! Bus solver seam and closed-form reference solve.

use crate::error::{SimError, SimResult};
use vf_components::common::MIN_DIVISOR;
use vf_components::{LinkContribution, SolvedLink};
use vf_core::units::{Conductance, amps, volts};

/// The network-solver seam.
///
/// The real admittance-matrix solver lives in the host environment; links
/// never see it directly. Anything that can turn a link's Thevenin
/// contribution into a converged current and a pair of node potentials can
/// drive a link.
pub trait BusSolver {
    /// Converge the network for one step and return this link's share.
    fn solve(&mut self, contribution: &LinkContribution) -> SimResult<SolvedLink>;
}

/// Closed-form solve of one link against a fixed load to ground.
///
/// Two nodes: the link spans ground and the bus, a constant load conductance
/// hangs off the bus. Norton equivalent of the link gives:
///
/// ```text
/// V_bus = Vs * G / (G + G_load)
/// flux  = (Vs - V_bus) * G
/// ```
///
/// where `G` is the link conductance derated by the pass-through blockage.
/// Positive flux discharges the source into the load.
#[derive(Clone, Debug)]
pub struct FixedLoadBus {
    load_conductance_s: f64,
}

impl FixedLoadBus {
    /// # Errors
    /// Fails if the load conductance is negative or non-finite.
    pub fn new(load_conductance: Conductance) -> SimResult<Self> {
        let load_conductance_s = load_conductance.value;
        if !load_conductance_s.is_finite() || load_conductance_s < 0.0 {
            return Err(SimError::InvalidArg {
                what: "load conductance cannot be negative",
            });
        }
        Ok(Self { load_conductance_s })
    }
}

impl BusSolver for FixedLoadBus {
    fn solve(&mut self, contribution: &LinkContribution) -> SimResult<SolvedLink> {
        let g = contribution.conductance.value * (1.0 - contribution.blockage.clamp(0.0, 1.0));
        let vs = contribution.source_voltage.value;
        let g_load = self.load_conductance_s;

        let bus_v = vs * g / (g + g_load).max(MIN_DIVISOR);
        let flux_a = (vs - bus_v) * g;

        Ok(SolvedLink {
            flux: amps(flux_a),
            port_potentials: [volts(0.0), volts(bus_v)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vf_core::units::siemens;

    fn contribution(g: f64, vs: f64, blockage: f64) -> LinkContribution {
        LinkContribution {
            conductance: siemens(g),
            source_voltage: volts(vs),
            blockage,
        }
    }

    #[test]
    fn rejects_negative_load() {
        assert!(FixedLoadBus::new(siemens(-1.0)).is_err());
        assert!(FixedLoadBus::new(siemens(0.0)).is_ok());
    }

    #[test]
    fn divider_solution() {
        let mut bus = FixedLoadBus::new(siemens(1.0)).unwrap();
        let solved = bus.solve(&contribution(1.0, 100.0, 0.0)).unwrap();
        // Equal conductances: bus sits at half the source voltage
        assert!((solved.port_potentials[1].value - 50.0).abs() < 1e-9);
        assert!((solved.flux.value - 50.0).abs() < 1e-9);
        assert_eq!(solved.port_potentials[0].value, 0.0);
    }

    #[test]
    fn full_blockage_kills_flux() {
        let mut bus = FixedLoadBus::new(siemens(1.0)).unwrap();
        let solved = bus.solve(&contribution(1.0, 100.0, 1.0)).unwrap();
        assert_eq!(solved.flux.value, 0.0);
        assert_eq!(solved.port_potentials[1].value, 0.0);
    }

    #[test]
    fn zero_load_floats_the_bus() {
        let mut bus = FixedLoadBus::new(siemens(0.0)).unwrap();
        let solved = bus.solve(&contribution(10.0, 100.0, 0.0)).unwrap();
        // No load: bus rises to the source voltage, no current flows
        assert!((solved.port_potentials[1].value - 100.0).abs() < 1e-4);
        assert!(solved.flux.value.abs() < 1e-2);
    }
}
