//! Single battery cell with electro-thermal failure modes.

use crate::common::{MIN_DIVISOR, OPEN_RESISTANCE_OHM, SHORT_RESISTANCE_OHM};
use crate::error::{ComponentError, ComponentResult};
use uom::si::electric_charge::ampere_hour;
use vf_core::units::constants::SECONDS_PER_HOUR;
use vf_core::units::{Charge, Power, Resistance, Voltage, ah, ohms, volts, watts};
use vf_volt::VocCurve;

/// One cell of a multi-cell battery.
///
/// Tracks state of charge by Coulomb counting and carries four malfunction
/// modes that modify how the cell presents itself to the pack reduction:
///
/// - short circuit: near-zero resistance, stored energy dumped
/// - open circuit: near-infinite resistance, no current path
/// - capacity override: rated capacity replaced by an injected value
/// - thermal runaway: cell drops off the circuit and burns its stored energy
///   internally as waste heat over a bounded window
///
/// Precedence for the equivalent resistance is short > open/runaway > nominal.
///
/// ## Thermal runaway model
///
/// On activation the cell derives a constant power ramp rate such that a
/// linearly increasing dissipation, integrated over `duration` seconds,
/// exactly consumes the energy stored at activation:
///
/// ```text
/// E = soc * capacity * Voc * 3600        (joules)
/// rate = 2 * E / duration^2              (W/s)
/// ```
///
/// The ramp assumes constant voltage; actual voltage falls as SOC depletes,
/// so the cell can exhaust slightly before `duration` elapses. That is an
/// accepted approximation of the real event, which is dominated by the total
/// energy release rather than its exact profile.
#[derive(Clone, Debug)]
pub struct BatteryCell {
    /// Nominal internal resistance (Ω), fixed after construction.
    resistance_ohm: f64,
    /// Rated capacity (A·h), fixed after construction.
    max_capacity_ah: f64,
    /// State of charge, hard-clamped to [0, 1].
    soc: f64,
    /// Current runaway waste-heat dissipation (W).
    runaway_power_w: f64,
    /// Runaway power ramp rate (W/s); 0 means not yet derived.
    runaway_power_rate_w_per_s: f64,
    malf_open_circuit: bool,
    malf_short_circuit: bool,
    malf_capacity_flag: bool,
    malf_capacity_ah: f64,
    malf_thermal_runaway: bool,
    malf_thermal_runaway_duration_s: f64,
}

impl BatteryCell {
    /// Create a cell.
    ///
    /// # Errors
    /// Fails if resistance is negative, capacity is not positive, or the
    /// initial SOC lies outside [0, 1]. Construction is all-or-nothing.
    pub fn new(resistance: Resistance, max_capacity: Charge, soc: f64) -> ComponentResult<Self> {
        let resistance_ohm = resistance.value;
        let max_capacity_ah = max_capacity.get::<ampere_hour>();

        if !resistance_ohm.is_finite() || resistance_ohm < 0.0 {
            return Err(ComponentError::Initialization {
                what: "cell resistance cannot be negative",
            });
        }
        if !max_capacity_ah.is_finite() || max_capacity_ah <= 0.0 {
            return Err(ComponentError::Initialization {
                what: "cell capacity must be positive",
            });
        }
        if !(0.0..=1.0).contains(&soc) {
            return Err(ComponentError::Initialization {
                what: "cell initial soc must lie in [0, 1]",
            });
        }

        Ok(Self {
            resistance_ohm,
            max_capacity_ah,
            soc,
            runaway_power_w: 0.0,
            runaway_power_rate_w_per_s: 0.0,
            malf_open_circuit: false,
            malf_short_circuit: false,
            malf_capacity_flag: false,
            malf_capacity_ah: 0.0,
            malf_thermal_runaway: false,
            malf_thermal_runaway_duration_s: 0.0,
        })
    }

    /// Resistance this cell presents to the pack reduction.
    ///
    /// Short circuit wins over everything; an open or runaway cell looks like
    /// a (large, finite) open circuit; otherwise the nominal resistance.
    pub fn effective_resistance(&self) -> Resistance {
        if self.malf_short_circuit {
            ohms(SHORT_RESISTANCE_OHM)
        } else if self.malf_open_circuit || self.malf_thermal_runaway {
            ohms(OPEN_RESISTANCE_OHM)
        } else {
            ohms(self.resistance_ohm)
        }
    }

    /// SOC this cell reports to the pack aggregation.
    ///
    /// Disconnected (open/short) cells report 0. A runaway cell reports its
    /// real SOC: runaway depletion is tracked as genuine charge loss.
    pub fn effective_soc(&self) -> f64 {
        if self.malf_open_circuit || self.malf_short_circuit {
            0.0
        } else {
            self.soc
        }
    }

    /// Capacity this cell contributes to the pack total.
    pub fn effective_capacity(&self) -> Charge {
        ah(self.effective_capacity_ah())
    }

    pub(crate) fn effective_capacity_ah(&self) -> f64 {
        if self.malf_open_circuit || self.malf_short_circuit {
            0.0
        } else if self.malf_capacity_flag {
            self.malf_capacity_ah
        } else {
            self.max_capacity_ah
        }
    }

    /// Open-circuit voltage this cell presents to the source reduction.
    ///
    /// Short circuit returns 0 explicitly rather than relying on the table
    /// evaluating to 0 at SOC 0; a substituted table with a non-zero origin
    /// must not leak voltage out of a shorted cell.
    pub fn effective_voltage(&self, voc: &dyn VocCurve) -> Voltage {
        if self.malf_short_circuit
            || self.malf_open_circuit
            || self.malf_thermal_runaway
        {
            volts(0.0)
        } else {
            voc.evaluate(self.soc)
        }
    }

    /// Integrate state of charge over one step.
    ///
    /// `current_a` is the discharge current this cell is asked to carry
    /// (positive depletes). Runaway self-discharge is added on top of it;
    /// an open-circuited cell ignores the external current but still burns
    /// internally if runaway is active.
    pub fn update_soc(&mut self, current_a: f64, dt: f64, voc: &dyn VocCurve) {
        if self.malf_short_circuit {
            // All stored energy dumped through the short.
            self.soc = 0.0;
            return;
        }
        if self.malf_open_circuit && !self.malf_thermal_runaway {
            return;
        }

        let mut total_current_a = if self.malf_open_circuit {
            0.0
        } else {
            current_a
        };

        if self.malf_thermal_runaway {
            let voltage_v = voc.evaluate(self.soc).value;
            if self.runaway_power_rate_w_per_s == 0.0 {
                // First step after activation: derive the constant ramp rate
                // that consumes the stored energy over the malfunction window.
                let capacity_ah = self.effective_capacity_ah();
                let duration_s = self.malf_thermal_runaway_duration_s.max(MIN_DIVISOR);
                self.runaway_power_rate_w_per_s =
                    2.0 * self.soc * capacity_ah * voltage_v * SECONDS_PER_HOUR
                        / (duration_s * duration_s);
            }
            self.runaway_power_w += dt * self.runaway_power_rate_w_per_s;
            if voltage_v > 0.0 {
                total_current_a += self.runaway_power_w / voltage_v;
            }
        }

        let capacity_ah = self.effective_capacity_ah().max(MIN_DIVISOR);
        self.soc = (self.soc - total_current_a * dt / capacity_ah / SECONDS_PER_HOUR)
            .clamp(0.0, 1.0);

        if self.malf_thermal_runaway && self.soc <= 0.0 {
            // Energy exhausted, possibly before the nominal duration elapsed.
            self.runaway_power_w = 0.0;
            self.runaway_power_rate_w_per_s = 0.0;
        }
    }

    /// Current state of charge.
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// Current runaway waste-heat dissipation.
    pub fn runaway_power(&self) -> Power {
        watts(self.runaway_power_w)
    }

    pub(crate) fn runaway_power_w(&self) -> f64 {
        self.runaway_power_w
    }

    /// Runaway power ramp rate (W/s).
    pub fn runaway_power_rate(&self) -> f64 {
        self.runaway_power_rate_w_per_s
    }

    pub fn malf_open_circuit(&self) -> bool {
        self.malf_open_circuit
    }

    pub fn malf_short_circuit(&self) -> bool {
        self.malf_short_circuit
    }

    pub fn malf_thermal_runaway(&self) -> bool {
        self.malf_thermal_runaway
    }

    /// Active capacity override, if any.
    pub fn malf_capacity(&self) -> Option<Charge> {
        self.malf_capacity_flag.then(|| ah(self.malf_capacity_ah))
    }

    pub fn set_malf_open_circuit(&mut self, flag: bool) {
        self.malf_open_circuit = flag;
    }

    pub fn set_malf_short_circuit(&mut self, flag: bool) {
        self.malf_short_circuit = flag;
    }

    pub fn set_malf_capacity(&mut self, flag: bool, value: Charge) {
        self.malf_capacity_flag = flag;
        self.malf_capacity_ah = value.get::<ampere_hour>();
    }

    /// Activate or reset the thermal-runaway malfunction.
    ///
    /// Clearing the flag zeroes the runaway power, ramp rate, and duration
    /// immediately, regardless of SOC; the cell reads as normal again on the
    /// next query. Re-asserting the flag while already active only refreshes
    /// the duration and leaves the ramp untouched.
    pub fn set_malf_thermal_runaway(&mut self, flag: bool, duration_s: f64) {
        self.malf_thermal_runaway = flag;
        if flag {
            self.malf_thermal_runaway_duration_s = duration_s;
        } else {
            self.malf_thermal_runaway_duration_s = 0.0;
            self.runaway_power_w = 0.0;
            self.runaway_power_rate_w_per_s = 0.0;
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use vf_volt::VocTable;

    proptest! {
        #[test]
        fn soc_stays_a_fraction(
            soc0 in 0.0_f64..=1.0,
            currents in proptest::collection::vec(-500.0_f64..500.0, 1..50),
            dt in 1e-3_f64..10.0,
        ) {
            let voc = VocTable::linear(0.0, 4.2).unwrap();
            let mut c = BatteryCell::new(ohms(0.05), ah(8.0), soc0).unwrap();
            for current in currents {
                c.update_soc(current, dt, &voc);
                prop_assert!((0.0..=1.0).contains(&c.soc()));
            }
        }
    }
}
