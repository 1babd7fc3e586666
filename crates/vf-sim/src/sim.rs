//! Fixed-step driver and result recording.

use crate::bus::BusSolver;
use crate::error::{SimError, SimResult};
use tracing::{debug, trace};
use vf_components::{NetworkLink, SolvedLink};

/// Options for stepping a link against a bus solver.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            t_end: 10.0,
            max_steps: 100_000,
            record_every: 10,
        }
    }
}

/// Record of solved link states over a run.
#[derive(Clone, Debug)]
pub struct SimRecord {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// Solved link states at those times
    pub solved: Vec<SolvedLink>,
}

/// Drive one link through the strict per-tick sequence:
/// `update_state` → bus solve → `update_flux`.
///
/// Deterministic by construction: the same link, solver, and options always
/// produce bit-identical records.
pub fn run_sim<L, B>(link: &mut L, bus: &mut B, opts: &SimOptions) -> SimResult<SimRecord>
where
    L: NetworkLink + ?Sized,
    B: BusSolver + ?Sized,
{
    if opts.dt <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if opts.t_end < 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.max_steps == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps must be positive",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let mut t = 0.0;
    let mut step = 0;
    let mut t_record = Vec::new();
    let mut solved_record = Vec::new();
    let mut last_solved = None;

    while t < opts.t_end && step < opts.max_steps {
        let contribution = link.update_state(opts.dt)?;
        let solved = bus.solve(&contribution)?;
        link.update_flux(opts.dt, &solved)?;

        t += opts.dt;
        step += 1;
        trace!(
            link = link.name(),
            t,
            flux_a = solved.flux.value,
            "link stepped"
        );

        if step % opts.record_every == 0 {
            t_record.push(t);
            solved_record.push(solved);
        }
        last_solved = Some(solved);
    }

    // Always record the final state
    if step % opts.record_every != 0 {
        if let Some(solved) = last_solved {
            t_record.push(t);
            solved_record.push(solved);
        }
    }

    debug!(
        link = link.name(),
        steps = step,
        recorded = t_record.len(),
        "run complete"
    );

    Ok(SimRecord {
        t: t_record,
        solved: solved_record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::FixedLoadBus;
    use vf_core::units::siemens;

    struct NullLink;

    impl NetworkLink for NullLink {
        fn name(&self) -> &str {
            "null"
        }

        fn ports(&self) -> vf_components::Ports {
            vf_components::Ports {
                negative: vf_core::NodeId::from_index(0),
                positive: vf_core::NodeId::from_index(1),
            }
        }

        fn update_state(
            &mut self,
            _dt: f64,
        ) -> vf_components::ComponentResult<vf_components::LinkContribution> {
            Ok(vf_components::LinkContribution {
                conductance: siemens(1.0),
                source_voltage: vf_core::units::volts(10.0),
                blockage: 0.0,
            })
        }

        fn update_flux(
            &mut self,
            _dt: f64,
            _solved: &SolvedLink,
        ) -> vf_components::ComponentResult<()> {
            Ok(())
        }
    }

    #[test]
    fn rejects_bad_options() {
        let mut bus = FixedLoadBus::new(siemens(1.0)).unwrap();
        for opts in [
            SimOptions {
                dt: 0.0,
                ..Default::default()
            },
            SimOptions {
                t_end: -1.0,
                ..Default::default()
            },
            SimOptions {
                max_steps: 0,
                ..Default::default()
            },
            SimOptions {
                record_every: 0,
                ..Default::default()
            },
        ] {
            assert!(run_sim(&mut NullLink, &mut bus, &opts).is_err());
        }
    }

    #[test]
    fn records_decimated_plus_final() {
        let mut bus = FixedLoadBus::new(siemens(1.0)).unwrap();
        let opts = SimOptions {
            dt: 0.1,
            t_end: 2.5,
            max_steps: 1000,
            record_every: 10,
        };
        let record = run_sim(&mut NullLink, &mut bus, &opts).unwrap();
        // 25 steps: records at step 10 and 20, plus the off-cadence final
        assert_eq!(record.t.len(), 3);
        assert_eq!(record.solved.len(), 3);
        assert!(record.t.windows(2).all(|w| w[0] < w[1]));
    }
}
