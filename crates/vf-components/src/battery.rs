//! Multi-cell battery link model.

use std::sync::Arc;

use crate::cell::BatteryCell;
use crate::common::{MIN_DIVISOR, check_finite};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{LinkContribution, NetworkLink, Ports, SolvedLink};
use uom::si::electric_charge::ampere_hour;
use vf_core::units::{
    Charge, Conductance, Current, Power, Voltage, ah, amps, siemens, volts, watts,
};
use vf_volt::VocCurve;

/// Battery configuration, fixed for the life of the link.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatteryConfig {
    /// Number of cells in the pack (>= 1).
    pub num_cells: usize,
    /// Cells wired in parallel (true) or in series (false).
    pub cells_in_parallel: bool,
    /// Resistance of the pack interconnects, in series with the cell block.
    pub interconnect_resistance: vf_core::units::Resistance,
    /// Internal resistance of each cell.
    pub cell_resistance: vf_core::units::Resistance,
    /// Rated capacity of the whole pack, split evenly across cells.
    pub max_capacity: Charge,
}

/// Battery initial-state input data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatteryInput {
    /// Initial state of charge applied to every cell.
    pub soc: f64,
    /// Base-link blockage fraction passed through to the solver.
    pub blockage: f64,
}

/// Composite battery link: N cells reduced to one Thevenin equivalent.
///
/// Before each network solve the pack collapses its cells (plus interconnect
/// resistance) into a single conductance and source voltage; after the solve
/// it splits the converged link current equally among the cells that still
/// hold charge and integrates each cell's SOC.
///
/// ## Circuit reduction
///
/// ```text
/// parallel:  R = Ri + 1 / Σ(1 / R_cell)        Vs = max(Voc_cell)
/// series:    R = Ri + Σ R_cell                 Vs = Σ Voc_cell
/// ```
///
/// Parallel cells present their highest-voltage member to the bus; series
/// cells sum. Every divisor is floored to keep failed-cell extremes finite.
///
/// ## Thermal-runaway cascade
///
/// The battery-level runaway malfunction marches cell-by-cell: the active
/// cell's own runaway malfunction is asserted every step, and after
/// `interval` seconds the next cell begins its own burn, producing a
/// time-staggered cascade rather than a simultaneous event. Deactivating the
/// malfunction clears every cell's runaway flag in a single pass, so a cell
/// malfunction set independently afterwards is not clobbered on later steps.
pub struct Battery {
    name: String,
    ports: Ports,
    cells: Vec<BatteryCell>,
    voc: Arc<dyn VocCurve>,
    cells_in_parallel: bool,
    interconnect_resistance_ohm: f64,
    blockage: f64,

    malf_thermal_runaway: bool,
    runaway_cell_duration_s: f64,
    runaway_interval_s: f64,
    runaway_cell_index: usize,
    cascade_timer_s: f64,
    cascade_engaged: bool,

    conductance_s: f64,
    source_voltage_v: f64,
    current_a: f64,
    voltage_v: f64,
    soc: f64,
    capacity_ah: f64,
    heat_w: f64,
}

impl Battery {
    /// Create a battery link.
    ///
    /// Each cell is configured with the pack's cell resistance and an even
    /// share of the pack capacity, all starting at the same input SOC.
    ///
    /// # Errors
    /// Fails if the interconnect resistance is negative, the cell count is
    /// zero, the initial SOC or blockage lies outside [0, 1], or per-cell
    /// validation rejects the resistance/capacity split. All-or-nothing: on
    /// error no link exists.
    pub fn new(
        name: String,
        cfg: &BatteryConfig,
        input: &BatteryInput,
        voc: Arc<dyn VocCurve>,
        ports: Ports,
    ) -> ComponentResult<Self> {
        let interconnect_resistance_ohm = cfg.interconnect_resistance.value;
        if !interconnect_resistance_ohm.is_finite() || interconnect_resistance_ohm < 0.0 {
            return Err(ComponentError::Initialization {
                what: "interconnect resistance cannot be negative",
            });
        }
        if cfg.num_cells < 1 {
            return Err(ComponentError::Initialization {
                what: "battery needs at least one cell",
            });
        }
        if !(0.0..=1.0).contains(&input.soc) {
            return Err(ComponentError::Initialization {
                what: "battery initial soc must lie in [0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&input.blockage) {
            return Err(ComponentError::Initialization {
                what: "blockage must lie in [0, 1]",
            });
        }

        let cell_capacity = ah(cfg.max_capacity.get::<ampere_hour>() / cfg.num_cells as f64);
        let cells = (0..cfg.num_cells)
            .map(|_| BatteryCell::new(cfg.cell_resistance, cell_capacity, input.soc))
            .collect::<ComponentResult<Vec<_>>>()?;

        Ok(Self {
            name,
            ports,
            cells,
            voc,
            cells_in_parallel: cfg.cells_in_parallel,
            interconnect_resistance_ohm,
            blockage: input.blockage,
            malf_thermal_runaway: false,
            runaway_cell_duration_s: 0.0,
            runaway_interval_s: 0.0,
            runaway_cell_index: 0,
            cascade_timer_s: 0.0,
            cascade_engaged: false,
            conductance_s: 0.0,
            source_voltage_v: 0.0,
            current_a: 0.0,
            voltage_v: 0.0,
            soc: input.soc,
            capacity_ah: cfg.max_capacity.get::<ampere_hour>(),
            heat_w: 0.0,
        })
    }

    /// Drive the cell-by-cell runaway cascade.
    fn step_runaway_cascade(&mut self, dt: f64) {
        if self.cells.is_empty() {
            return;
        }
        if self.malf_thermal_runaway {
            // Wrap a forced out-of-range index instead of failing.
            if self.runaway_cell_index >= self.cells.len() {
                self.runaway_cell_index = 0;
            }
            self.cells[self.runaway_cell_index]
                .set_malf_thermal_runaway(true, self.runaway_cell_duration_s);
            self.cascade_engaged = true;
            self.cascade_timer_s += dt;
            if self.cascade_timer_s >= self.runaway_interval_s {
                self.cascade_timer_s = 0.0;
                self.runaway_cell_index = (self.runaway_cell_index + 1) % self.cells.len();
            }
        } else if self.cascade_engaged {
            // Malfunction just deactivated: one global reset pass, exactly
            // once, so a later independently-set cell malfunction survives.
            // The latch, not the timer, marks the edge; a stagger interval
            // at or below dt leaves the timer at zero after every step.
            for cell in &mut self.cells {
                cell.set_malf_thermal_runaway(false, 0.0);
            }
            self.cascade_engaged = false;
            self.cascade_timer_s = 0.0;
            self.runaway_cell_index = 0;
        }
    }

    fn parallel_resistance_ohm(&self) -> f64 {
        let sum: f64 = self
            .cells
            .iter()
            .map(|c| 1.0 / c.effective_resistance().value.max(MIN_DIVISOR))
            .sum();
        (1.0 / sum).max(MIN_DIVISOR)
    }

    fn series_resistance_ohm(&self) -> f64 {
        let sum: f64 = self
            .cells
            .iter()
            .map(|c| c.effective_resistance().value)
            .sum();
        sum.max(MIN_DIVISOR)
    }

    fn reduce_source_voltage_v(&self) -> f64 {
        let voc = self.voc.as_ref();
        if self.cells_in_parallel {
            self.cells
                .iter()
                .map(|c| c.effective_voltage(voc).value)
                .fold(0.0, f64::max)
        } else {
            self.cells
                .iter()
                .map(|c| c.effective_voltage(voc).value)
                .sum()
        }
    }

    /// Battery-level thermal-runaway cascade malfunction.
    ///
    /// `cell_duration_s` is each cell's own burn window; `interval_s` is the
    /// stagger between successive cells. Clearing the flag triggers a one-shot
    /// reset of every cell on the next `update_state`.
    pub fn set_malf_thermal_runaway(&mut self, flag: bool, cell_duration_s: f64, interval_s: f64) {
        self.malf_thermal_runaway = flag;
        self.runaway_cell_duration_s = cell_duration_s;
        self.runaway_interval_s = interval_s;
    }

    /// Set the pass-through base-link blockage fraction (clamped to [0, 1]).
    pub fn set_blockage(&mut self, fraction: f64) {
        self.blockage = fraction.clamp(0.0, 1.0);
    }

    /// Terminal voltage: solved potential at the positive port.
    pub fn voltage(&self) -> Voltage {
        volts(self.voltage_v)
    }

    /// Pack SOC, averaged over all cells (a dead cell drags it down).
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// Total effective capacity of the pack.
    pub fn capacity(&self) -> Charge {
        ah(self.capacity_ah)
    }

    /// Link current from the last solve.
    pub fn current(&self) -> Current {
        amps(self.current_a)
    }

    /// Waste heat: runaway dissipation plus ordinary joule heating.
    pub fn heat(&self) -> Power {
        watts(self.heat_w)
    }

    /// Link conductance from the last `update_state`.
    pub fn conductance(&self) -> Conductance {
        siemens(self.conductance_s)
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, index: usize) -> Option<&BatteryCell> {
        self.cells.get(index)
    }

    /// Mutable cell access for the per-cell malfunction control surface.
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut BatteryCell> {
        self.cells.get_mut(index)
    }

    /// Effective open-circuit voltage of one cell; 0 V for an out-of-range
    /// index rather than an error, for telemetry robustness.
    pub fn cell_effective_voltage(&self, index: usize) -> Voltage {
        self.cells
            .get(index)
            .map_or(volts(0.0), |c| c.effective_voltage(self.voc.as_ref()))
    }
}

impl NetworkLink for Battery {
    fn name(&self) -> &str {
        &self.name
    }

    fn ports(&self) -> Ports {
        self.ports
    }

    fn update_state(&mut self, dt: f64) -> ComponentResult<LinkContribution> {
        self.step_runaway_cascade(dt);

        let cell_block_ohm = if self.cells_in_parallel {
            self.parallel_resistance_ohm()
        } else {
            self.series_resistance_ohm()
        };
        let total_ohm = self.interconnect_resistance_ohm + cell_block_ohm;
        self.conductance_s = 1.0 / total_ohm.max(MIN_DIVISOR);
        self.source_voltage_v = self.reduce_source_voltage_v();

        Ok(LinkContribution {
            conductance: siemens(self.conductance_s),
            source_voltage: volts(self.source_voltage_v),
            blockage: self.blockage,
        })
    }

    fn update_flux(&mut self, dt: f64, solved: &SolvedLink) -> ComponentResult<()> {
        let flux_a = solved.flux.value;
        check_finite(flux_a, "solved link flux")?;

        self.current_a = flux_a;
        self.voltage_v = solved.port_potentials[1].value;

        if self.cells.is_empty() {
            self.soc = 0.0;
            self.capacity_ah = 0.0;
            self.heat_w = 0.0;
            return Ok(());
        }

        // All cells still holding charge are assumed to share the link
        // current equally; real packs would not divide this evenly.
        let active_cells = self
            .cells
            .iter()
            .filter(|c| c.effective_soc() > MIN_DIVISOR)
            .count();
        if active_cells > 0 {
            let per_cell_a = flux_a / active_cells as f64;
            let voc = Arc::clone(&self.voc);
            for cell in &mut self.cells {
                cell.update_soc(per_cell_a, dt, voc.as_ref());
            }
        }

        self.soc =
            self.cells.iter().map(BatteryCell::effective_soc).sum::<f64>() / self.cells.len() as f64;
        self.capacity_ah = self
            .cells
            .iter()
            .map(BatteryCell::effective_capacity_ah)
            .sum();
        let runaway_w: f64 = self.cells.iter().map(BatteryCell::runaway_power_w).sum();
        self.heat_w = runaway_w + flux_a * flux_a / self.conductance_s.max(MIN_DIVISOR);

        Ok(())
    }
}
