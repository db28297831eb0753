//! Cell-level view of the pack.

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::{
    analysis::extract::ExtractedInputData,
    quantity::{Celsius, Volts},
};

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSummary {
    pub n_cells: usize,
    pub min_voltage: Volts,
    pub max_voltage: Volts,
    pub mean_voltage: Volts,

    /// Difference between the highest and the lowest cell, the imbalance indicator.
    pub voltage_spread: Volts,

    pub min_temperature: Option<Celsius>,
    pub max_temperature: Option<Celsius>,
}

impl CellSummary {
    /// Summarize the cell readings, if there are any cell voltages.
    pub fn try_from_data(data: &ExtractedInputData) -> Option<Self> {
        let (min_voltage, max_voltage) = bounds(&data.cell_voltages)?;
        let n_cells = data.cell_voltages.len();
        #[expect(clippy::cast_precision_loss)]
        let mean_voltage = data.cell_voltages.iter().copied().sum::<Volts>() / n_cells as f64;
        let temperatures = bounds(&data.cell_temperatures);
        Some(Self {
            n_cells,
            min_voltage,
            max_voltage,
            mean_voltage,
            voltage_spread: max_voltage - min_voltage,
            min_temperature: temperatures.map(|(min, _)| min),
            max_temperature: temperatures.map(|(_, max)| max),
        })
    }
}

fn bounds<T: Copy + Ord>(values: &[T]) -> Option<(T, T)> {
    match values.iter().copied().minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(value) => Some((value, value)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}
