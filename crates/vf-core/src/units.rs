// vf-core/src/units.rs

use uom::si::f64::{
    ElectricCharge as UomElectricCharge, ElectricCurrent as UomElectricCurrent,
    ElectricPotential as UomElectricPotential,
    ElectricalConductance as UomElectricalConductance,
    ElectricalResistance as UomElectricalResistance, Power as UomPower, Ratio as UomRatio,
    Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Charge = UomElectricCharge;
pub type Current = UomElectricCurrent;
pub type Voltage = UomElectricPotential;
pub type Conductance = UomElectricalConductance;
pub type Resistance = UomElectricalResistance;
pub type Power = UomPower;
pub type Ratio = UomRatio;
pub type Time = UomTime;

#[inline]
pub fn volts(v: f64) -> Voltage {
    use uom::si::electric_potential::volt;
    Voltage::new::<volt>(v)
}

#[inline]
pub fn amps(v: f64) -> Current {
    use uom::si::electric_current::ampere;
    Current::new::<ampere>(v)
}

#[inline]
pub fn ohms(v: f64) -> Resistance {
    use uom::si::electrical_resistance::ohm;
    Resistance::new::<ohm>(v)
}

#[inline]
pub fn siemens(v: f64) -> Conductance {
    use uom::si::electrical_conductance::siemens;
    Conductance::new::<siemens>(v)
}

/// Amp-hours, the customary unit for battery capacity.
#[inline]
pub fn ah(v: f64) -> Charge {
    use uom::si::electric_charge::ampere_hour;
    Charge::new::<ampere_hour>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn secs(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

pub mod constants {
    /// Conversion between amp-hour capacity and amp-second charge integration.
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
}
