//! Physical quantities read from the battery management system.

#[macro_use]
mod macros;

quantity!(AmpereHours, "Ah");
quantity!(Amperes, "A");
quantity!(Celsius, "°C");
quantity!(Percent, "%");
quantity!(Volts, "V");

impl Volts {
    pub const fn from_millivolts(millivolts: f64) -> Self {
        Self(0.001 * millivolts)
    }
}
