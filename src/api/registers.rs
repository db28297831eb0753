use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Flat register snapshot as returned by the register-reading service.
///
/// Malformed registers are skipped rather than failing the whole snapshot.
#[must_use]
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegisterSnapshot {
    #[serde_as(as = "serde_with::MapSkipError<_, _>")]
    #[serde(default)]
    pub basic_registers: BTreeMap<String, Register>,

    #[serde(default)]
    pub cell_data: BTreeMap<String, CellArray>,

    #[serde(default)]
    pub ascii_strings: BTreeMap<String, serde_json::Value>,

    #[serde_as(as = "serde_with::MapSkipError<_, _>")]
    #[serde(default)]
    pub experimental_registers: BTreeMap<String, Register>,
}

impl RegisterSnapshot {
    /// Find the register by its address.
    ///
    /// The keys are hex strings whose spelling depends on the reader (`0x0004`, `0x4`, `0X0004`),
    /// so the lookup goes by the `address` field instead.
    pub fn find(&self, address: u16) -> Option<&Register> {
        self.basic_registers
            .values()
            .chain(self.experimental_registers.values())
            .find(|register| register.address == address)
    }

    /// Numeric processed value of the register, if present and numeric.
    pub fn number(&self, address: u16) -> Option<f64> {
        self.find(address)?.processed_value.as_ref()?.as_f64()
    }

    /// Textual processed value of the register, if present.
    pub fn text(&self, address: u16) -> Option<String> {
        self.find(address)?.processed_value.as_ref().map(ToString::to_string)
    }
}

#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct Register {
    #[serde(default)]
    pub name: String,

    pub address: u16,

    #[serde(default)]
    pub raw_value: i64,

    /// Absent when the reader failed to decode the value.
    #[serde(default)]
    pub processed_value: Option<ProcessedValue>,

    #[serde(default)]
    pub unit: String,

    #[serde(default)]
    pub is_32bit: bool,
}

/// Processed register value: either a scaled number or a decoded string.
#[must_use]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, derive_more::Display)]
#[serde(untagged)]
pub enum ProcessedValue {
    #[display("{_0}")]
    Number(f64),

    #[display("{_0}")]
    Text(String),
}

impl ProcessedValue {
    /// Finite numeric value. Numeric strings are accepted too.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

#[must_use]
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct CellArray {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub unit: String,

    #[serde_as(as = "serde_with::VecSkipError<_>")]
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl CellArray {
    /// Cells with a successful read status, if the whole array has been read successfully.
    pub fn ok_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |cell| self.success && cell.is_ok())
    }
}

#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct Cell {
    pub cell_number: u16,

    #[serde(default)]
    pub raw_value: i64,

    pub processed_value: ProcessedValue,

    pub status: String,
}

impl Cell {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
