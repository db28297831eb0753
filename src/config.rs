//! Reference battery parameters and register layout.

use std::{fmt::Debug, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Immutable engine configuration.
///
/// [`Default`] is the reference table for a 150 Ah LiFePO4 module, any field may be overridden
/// from a TOML file.
#[must_use]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Nominal capacity of a new pack, ampere-hours.
    pub nominal_capacity_ah: f64,

    /// Full equivalent cycles until the end of life.
    pub expected_cycles_eol: u32,

    /// Expected calendar life, years.
    pub expected_life_years: f64,

    /// State of health below which the pack is no longer useful, percent.
    pub min_useful_soh: f64,

    /// Depth of discharge assumed when the cycle counter is empty.
    pub default_depth_of_discharge: f64,

    /// Throughput of a single UPS discharge event, ampere-hours.
    pub ups_ah_per_event: f64,

    /// Throughput of a single solar cycle, ampere-hours.
    pub solar_ah_per_cycle: f64,

    /// Solar cycles per year when the solar phase does not say otherwise.
    pub default_solar_cycles_per_year: f64,

    pub cyclic: CyclicAging,
    pub calendar: CalendarAging,
    pub registers: RegisterAddresses,
    pub cells: CellBlocks,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            nominal_capacity_ah: 150.0,
            expected_cycles_eol: 6000,
            expected_life_years: 15.0,
            min_useful_soh: 70.0,
            default_depth_of_discharge: 0.8,
            ups_ah_per_event: 15.0,
            solar_ah_per_cycle: 120.0,
            default_solar_cycles_per_year: 365.0,
            cyclic: CyclicAging::default(),
            calendar: CalendarAging::default(),
            registers: RegisterAddresses::default(),
            cells: CellBlocks::default(),
        }
    }
}

impl HealthConfig {
    #[instrument(skip_all, fields(path = ?path))]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read the configuration from `{}`", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse the configuration `{}`", path.display()))?;
        config.validate()?;
        info!("loaded the configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result {
        ensure!(self.nominal_capacity_ah > 0.0, "nominal capacity must be positive");
        ensure!(self.expected_cycles_eol > 0, "expected cycles must be positive");
        ensure!(self.expected_life_years > 0.0, "expected life must be positive");
        ensure!(
            (0.0..=100.0).contains(&self.min_useful_soh),
            "minimal useful state of health must be within 0..=100",
        );
        ensure!(
            self.default_solar_cycles_per_year > 0.0,
            "default solar cycles per year must be positive",
        );
        Ok(())
    }
}

/// Cyclic (throughput) degradation curve, piecewise in the lifetime throughput progress.
#[must_use]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CyclicAging {
    /// Progress up to which degradation is linear.
    pub knee_progress: f64,

    /// Percent of degradation per unit of progress in the linear part.
    pub linear_slope: f64,

    /// Multiplier of the squared normalized progress past the knee.
    pub quadratic_factor: f64,

    /// Degradation cap, percent.
    pub max_degradation: f64,
}

impl Default for CyclicAging {
    fn default() -> Self {
        Self { knee_progress: 0.5, linear_slope: 10.0, quadratic_factor: 25.0, max_degradation: 30.0 }
    }
}

/// Calendar aging: a flat rate, slowed down during the first years and sped up afterwards.
#[must_use]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalendarAging {
    /// Percent per year.
    pub rate_per_year: f64,

    pub early_years: f64,
    pub early_factor: f64,
    pub late_factor: f64,

    /// Degradation cap, percent.
    pub max_degradation: f64,

    /// Share of the calendar degradation that counts towards the estimated state of health.
    pub soh_weight: f64,
}

impl Default for CalendarAging {
    fn default() -> Self {
        Self {
            rate_per_year: 1.5,
            early_years: 5.0,
            early_factor: 0.8,
            late_factor: 1.2,
            max_degradation: 20.0,
            soh_weight: 0.25,
        }
    }
}

/// Modbus addresses of the scalar registers.
#[must_use]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterAddresses {
    pub battery_voltage: u16,
    pub pack_voltage: u16,
    pub current: u16,
    pub state_of_charge: u16,
    pub state_of_health: u16,
    pub cell_count: u16,
    pub accumulated_discharge_ah: u16,
    pub cycle_count: u16,
    pub discharge_event_count: u16,
    pub firmware_version: u16,
}

impl Default for RegisterAddresses {
    fn default() -> Self {
        Self {
            battery_voltage: 0x0000,
            pack_voltage: 0x0001,
            current: 0x0002,
            state_of_charge: 0x0003,
            state_of_health: 0x0004,
            cell_count: 0x000A,
            accumulated_discharge_ah: 0x0042,
            cycle_count: 0x0044,
            discharge_event_count: 0x0046,
            firmware_version: 0x0101,
        }
    }
}

/// Keys of the redundant cell blocks in the `cell_data` section, in the order of preference.
#[must_use]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CellBlocks {
    pub voltages: Vec<String>,
    pub temperatures: Vec<String>,
}

impl Default for CellBlocks {
    fn default() -> Self {
        Self {
            voltages: vec!["cell_voltages_block1".to_string(), "cell_voltages_block2".to_string()],
            temperatures: vec![
                "cell_temperatures_block1".to_string(),
                "cell_temperatures_block2".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() -> Result {
        HealthConfig::default().validate()
    }

    #[test]
    #[expect(clippy::float_cmp)]
    fn partial_toml_ok() -> Result {
        // language=toml
        let config: HealthConfig = toml::from_str(
            r#"
                nominal_capacity_ah = 100.0

                [calendar]
                rate_per_year = 2.0

                [registers]
                state_of_health = 0x0010
            "#,
        )?;
        assert_eq!(config.nominal_capacity_ah, 100.0);
        assert_eq!(config.expected_cycles_eol, 6000);
        assert_eq!(config.calendar.rate_per_year, 2.0);
        assert_eq!(config.calendar.max_degradation, 20.0);
        assert_eq!(config.registers.state_of_health, 0x0010);
        assert_eq!(config.registers.current, 0x0002);
        Ok(())
    }

    #[test]
    fn round_trip_default_ok() -> Result {
        let config = HealthConfig::default();
        assert_eq!(toml::from_str::<HealthConfig>(&toml::to_string(&config)?)?, config);
        Ok(())
    }

    #[test]
    fn invalid_capacity_fails() {
        let config = HealthConfig { nominal_capacity_ah: 0.0, ..HealthConfig::default() };
        assert!(config.validate().is_err());
    }
}
