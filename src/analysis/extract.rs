//! Normalization of the raw snapshots into a flat set of readings.

use std::collections::BTreeMap;

use bon::Builder;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::{
    api::{BatteryId, BatterySnapshot, DeviceInfo, ElectronicLabel, RegisterSnapshot},
    config::HealthConfig,
    error::AnalysisError,
    prelude::*,
    quantity::{AmpereHours, Amperes, Celsius, Percent, Volts},
};

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// Readings the analysis is based on. Everything but the identity is optional.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInputData {
    #[builder(into)]
    pub battery_id: BatteryId,

    pub soh_real: Option<Percent>,
    pub soc_actual: Option<Percent>,
    pub voltage: Option<Volts>,
    pub pack_voltage: Option<Volts>,
    pub current: Option<Amperes>,

    /// Discharged throughput over the whole life.
    pub ah_accumulated: Option<AmpereHours>,

    pub cycles_reported: Option<u32>,
    pub discharge_event_count: Option<u32>,

    pub manufacture_date: Option<NaiveDate>,

    /// Years since the manufacture date, never negative.
    pub age_years: Option<f64>,

    #[builder(into)]
    pub model: Option<String>,

    #[builder(into)]
    pub manufacturer: Option<String>,

    #[builder(into)]
    pub serial_number: Option<String>,

    #[builder(into)]
    pub firmware_version: Option<String>,

    pub cell_count: Option<u32>,

    /// Ordered by the cell number.
    #[builder(default)]
    pub cell_voltages: Vec<Volts>,

    /// Ordered by the cell number.
    #[builder(default)]
    pub cell_temperatures: Vec<Celsius>,
}

/// Mandatory readings, guaranteed to be present and within range.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CriticalData {
    pub soh_real: Percent,
    pub ah_accumulated: AmpereHours,
}

#[instrument(skip_all, fields(battery_id = %battery.id))]
pub fn extract_input_data(
    config: &HealthConfig,
    battery: &BatterySnapshot,
    device_info: &DeviceInfo,
    registers: &RegisterSnapshot,
    now: DateTime<Utc>,
) -> ExtractedInputData {
    let addresses = &config.registers;
    let label = device_info.label();
    let manufacture_date = label.and_then(ElectronicLabel::manufacture_date);

    let data = ExtractedInputData {
        battery_id: battery.id.clone(),
        soh_real: registers.number(addresses.state_of_health).or(battery.soh).map(Percent),
        soc_actual: registers.number(addresses.state_of_charge).or(battery.soc).map(Percent),
        voltage: registers.number(addresses.battery_voltage).or(battery.voltage).map(Volts),
        pack_voltage: registers.number(addresses.pack_voltage).or(battery.pack_voltage).map(Volts),
        current: registers.number(addresses.current).or(battery.current).map(Amperes),
        ah_accumulated: registers.number(addresses.accumulated_discharge_ah).map(AmpereHours),
        cycles_reported: registers.number(addresses.cycle_count).and_then(to_count),
        discharge_event_count: registers
            .number(addresses.discharge_event_count)
            .and_then(to_count),
        manufacture_date,
        age_years: manufacture_date.map(|date| age_in_years(date, now)),
        model: label.and_then(|label| label.model.clone()),
        manufacturer: label.and_then(|label| label.manufacturer.clone()),
        serial_number: label.and_then(|label| label.barcode.clone()),
        firmware_version: registers.text(addresses.firmware_version),
        cell_count: registers.number(addresses.cell_count).and_then(to_count),
        cell_voltages: merge_cell_blocks(registers, &config.cells.voltages, |value, unit| {
            if unit.eq_ignore_ascii_case("mv") { Volts::from_millivolts(value) } else { Volts(value) }
        }),
        cell_temperatures: merge_cell_blocks(registers, &config.cells.temperatures, |value, _| {
            Celsius(value)
        }),
    };

    debug!(
        soh_real = ?data.soh_real,
        ah_accumulated = ?data.ah_accumulated,
        cycles_reported = ?data.cycles_reported,
        discharge_event_count = ?data.discharge_event_count,
        age_years = ?data.age_years,
        n_cell_voltages = data.cell_voltages.len(),
        n_cell_temperatures = data.cell_temperatures.len(),
        "extracted the input data",
    );
    data
}

/// Check the mandatory readings.
pub fn validate_input_data(data: &ExtractedInputData) -> Result<CriticalData, AnalysisError> {
    let soh_real =
        data.soh_real.ok_or(AnalysisError::MissingCriticalData { field: "sohReal" })?;
    let ah_accumulated =
        data.ah_accumulated.ok_or(AnalysisError::MissingCriticalData { field: "ahAccumulated" })?;
    if !(0.0..=100.0).contains(&soh_real.0) {
        return Err(AnalysisError::OutOfRange { field: "sohReal", value: soh_real.0 });
    }
    if ah_accumulated.0.is_nan() || ah_accumulated < AmpereHours::ZERO {
        return Err(AnalysisError::OutOfRange { field: "ahAccumulated", value: ah_accumulated.0 });
    }
    Ok(CriticalData { soh_real, ah_accumulated })
}

/// Years elapsed since the manufacture date, floored at zero.
#[must_use]
pub fn age_in_years(manufacture_date: NaiveDate, now: DateTime<Utc>) -> f64 {
    let manufactured_at = manufacture_date.and_time(NaiveTime::MIN).and_utc();
    ((now - manufactured_at).as_seconds_f64() / SECONDS_PER_YEAR).max(0.0)
}

#[expect(clippy::cast_possible_truncation)]
#[expect(clippy::cast_sign_loss)]
fn to_count(value: f64) -> Option<u32> {
    (value >= 0.0 && value <= f64::from(u32::MAX)).then(|| value.round() as u32)
}

/// Merge the redundant cell blocks: the first block wins, the next ones fill the gaps.
fn merge_cell_blocks<T>(
    registers: &RegisterSnapshot,
    blocks: &[String],
    convert: impl Fn(f64, &str) -> T,
) -> Vec<T> {
    let mut cells = BTreeMap::new();
    for block in blocks {
        let Some(array) = registers.cell_data.get(block) else {
            continue;
        };
        if !array.success {
            warn!(block = %block, "the cell block has not been read successfully");
            continue;
        }
        for cell in array.ok_cells() {
            if let Some(value) = cell.processed_value.as_f64() {
                cells.entry(cell.cell_number).or_insert_with(|| convert(value, &array.unit));
            }
        }
    }
    cells.into_values().collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;

    // language=json
    const REGISTERS: &str = r#"{
        "basic_registers": {
            "0x0000": {"name": "Battery Voltage", "address": 0, "raw_value": 5312, "processed_value": 53.12, "unit": "V"},
            "0x0002": {"name": "Current", "address": 2, "raw_value": 65086, "processed_value": -4.5, "unit": "A"},
            "0x0003": {"name": "SOC", "address": 3, "raw_value": 88, "processed_value": 88, "unit": "%"},
            "0x0004": {"name": "SOH", "address": 4, "raw_value": 97, "processed_value": 97, "unit": "%"},
            "0x000A": {"name": "Cell Count", "address": 10, "raw_value": 15, "processed_value": 15, "unit": ""},
            "0x0042": {"name": "Accumulated Discharge", "address": 66, "raw_value": 5000, "processed_value": 5000, "unit": "Ah", "is_32bit": true},
            "0x0044": {"name": "Cycles", "address": 68, "raw_value": 0, "processed_value": 0, "unit": ""},
            "0x0046": {"name": "Discharge Events", "address": 70, "raw_value": 400, "processed_value": 400, "unit": ""}
        },
        "cell_data": {
            "cell_voltages_block1": {
                "success": true,
                "description": "Cell voltages 1-2",
                "unit": "mV",
                "cells": [
                    {"cell_number": 2, "raw_value": 3310, "processed_value": 3310, "status": "ok"},
                    {"cell_number": 1, "raw_value": 0, "processed_value": 0, "status": "timeout"}
                ]
            },
            "cell_voltages_block2": {
                "success": true,
                "description": "Cell voltages 1-2",
                "unit": "V",
                "cells": [
                    {"cell_number": 1, "raw_value": 3305, "processed_value": 3.305, "status": "ok"},
                    {"cell_number": 2, "raw_value": 3999, "processed_value": 3.999, "status": "ok"}
                ]
            },
            "cell_temperatures_block1": {
                "success": false,
                "description": "Cell temperatures",
                "unit": "°C",
                "cells": [
                    {"cell_number": 1, "raw_value": 25, "processed_value": 25, "status": "ok"}
                ]
            },
            "cell_temperatures_block2": {
                "success": true,
                "description": "Cell temperatures",
                "unit": "°C",
                "cells": [
                    {"cell_number": 1, "raw_value": 23, "processed_value": 23, "status": "ok"}
                ]
            }
        },
        "experimental_registers": {
            "0x0101": {"name": "Firmware", "address": 257, "raw_value": 0, "processed_value": "V100R002", "unit": ""}
        }
    }"#;

    // language=json
    const DEVICE_INFO: &str = r#"{
        "status": "success",
        "detailed_info": {
            "status": "success",
            "info": {
                "manufacturer": "Huawei",
                "model": "ESM-48150B1",
                "barcode": "2102312345ABCD",
                "manufactured_date": "2021-03-15"
            }
        }
    }"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap()
    }

    fn extract() -> Result<ExtractedInputData> {
        let battery = BatterySnapshot::builder().id(214_u64).soh(50.0).pack_voltage(53.0).build();
        Ok(extract_input_data(
            &HealthConfig::default(),
            &battery,
            &serde_json::from_str(DEVICE_INFO)?,
            &serde_json::from_str(REGISTERS)?,
            now(),
        ))
    }

    #[test]
    fn extract_scalars_ok() -> Result {
        let data = extract()?;
        assert_eq!(data.battery_id, BatteryId::Number(214));
        assert_eq!(data.soh_real, Some(Percent(97.0)));
        assert_eq!(data.soc_actual, Some(Percent(88.0)));
        assert_eq!(data.voltage, Some(Volts(53.12)));
        assert_eq!(data.current, Some(Amperes(-4.5)));
        assert_eq!(data.ah_accumulated, Some(AmpereHours(5000.0)));
        assert_eq!(data.discharge_event_count, Some(400));
        assert_eq!(data.cell_count, Some(15));
        assert_eq!(data.firmware_version.as_deref(), Some("V100R002"));
        Ok(())
    }

    #[test]
    fn zero_cycles_is_present() -> Result {
        assert_eq!(extract()?.cycles_reported, Some(0));
        Ok(())
    }

    #[test]
    fn battery_snapshot_fallback_ok() -> Result {
        // No pack voltage register in the snapshot:
        assert_eq!(extract()?.pack_voltage, Some(Volts(53.0)));
        Ok(())
    }

    #[test]
    fn device_info_ok() -> Result {
        let data = extract()?;
        assert_eq!(data.manufacturer.as_deref(), Some("Huawei"));
        assert_eq!(data.model.as_deref(), Some("ESM-48150B1"));
        assert_eq!(data.serial_number.as_deref(), Some("2102312345ABCD"));
        assert_eq!(data.manufacture_date, NaiveDate::from_ymd_opt(2021, 3, 15));
        assert_abs_diff_eq!(data.age_years.unwrap(), 5.0, epsilon = 0.01);
        Ok(())
    }

    #[test]
    fn cell_blocks_merged_ok() -> Result {
        let data = extract()?;
        assert_eq!(data.cell_voltages.len(), 2);
        assert_abs_diff_eq!(data.cell_voltages[0].0, 3.305, epsilon = 1e-9);
        assert_abs_diff_eq!(data.cell_voltages[1].0, 3.310, epsilon = 1e-9);
        assert_eq!(data.cell_temperatures, vec![Celsius(23.0)]);
        Ok(())
    }

    #[test]
    fn empty_snapshots_ok() {
        let battery = BatterySnapshot::builder().id(1_u64).build();
        let data = extract_input_data(
            &HealthConfig::default(),
            &battery,
            &DeviceInfo::default(),
            &RegisterSnapshot::default(),
            now(),
        );
        assert_eq!(data.soh_real, None);
        assert_eq!(data.age_years, None);
        assert!(data.cell_voltages.is_empty());
    }

    #[test]
    fn future_manufacture_date_is_zero_age() {
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_abs_diff_eq!(age_in_years(date, now()), 0.0);
    }

    #[test]
    fn validate_ok() -> Result {
        let data = ExtractedInputData::builder()
            .battery_id(1_u64)
            .soh_real(Percent(100.0))
            .ah_accumulated(AmpereHours::ZERO)
            .build();
        let critical = validate_input_data(&data)?;
        assert_eq!(critical.soh_real, Percent(100.0));
        assert_eq!(critical.ah_accumulated, AmpereHours::ZERO);
        Ok(())
    }

    #[test]
    fn validate_missing_soh() {
        let data =
            ExtractedInputData::builder().battery_id(1_u64).ah_accumulated(AmpereHours(1.0)).build();
        assert_eq!(
            validate_input_data(&data),
            Err(AnalysisError::MissingCriticalData { field: "sohReal" })
        );
    }

    #[test]
    fn validate_missing_ah() {
        let data = ExtractedInputData::builder().battery_id(1_u64).soh_real(Percent(90.0)).build();
        assert_eq!(
            validate_input_data(&data),
            Err(AnalysisError::MissingCriticalData { field: "ahAccumulated" })
        );
    }

    #[test]
    fn validate_out_of_range() {
        let data = ExtractedInputData::builder()
            .battery_id(1_u64)
            .soh_real(Percent(101.0))
            .ah_accumulated(AmpereHours(1.0))
            .build();
        assert!(matches!(
            validate_input_data(&data),
            Err(AnalysisError::OutOfRange { field: "sohReal", .. })
        ));

        let data = ExtractedInputData::builder()
            .battery_id(1_u64)
            .soh_real(Percent(90.0))
            .ah_accumulated(AmpereHours(-1.0))
            .build();
        assert!(matches!(
            validate_input_data(&data),
            Err(AnalysisError::OutOfRange { field: "ahAccumulated", .. })
        ));
    }
}
