//! Data quality score: how much of the analysis is backed by actual readings.

use serde::Serialize;

use crate::{
    analysis::{
        extract::ExtractedInputData,
        inconsistency::{Inconsistency, Severity},
    },
    prelude::*,
};

const CRITICAL_PENALTY: u32 = 5;
const WARNING_PENALTY: u32 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum QualityRating {
    #[display("excellent")]
    Excellent,

    #[display("good")]
    Good,

    #[display("fair")]
    Fair,

    #[display("poor")]
    Poor,
}

impl QualityRating {
    pub const fn from_score(score: u32) -> Self {
        match score {
            85.. => Self::Excellent,
            70.. => Self::Good,
            50.. => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Excellent => "Datos completos y coherentes, el análisis es fiable",
            Self::Good => "Datos suficientes, el análisis es fiable con pequeñas reservas",
            Self::Fair => "Faltan datos relevantes, tome el análisis como orientativo",
            Self::Poor => "Datos insuficientes, el análisis es solo una aproximación",
        }
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct QualityFactor {
    pub name: &'static str,
    pub present: bool,

    /// Points awarded when present.
    pub points: u32,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataQuality {
    /// `0..=90`: the scored fields add up to 90 points.
    pub score: u32,

    pub rating: QualityRating,
    pub description: &'static str,
    pub factors: Vec<QualityFactor>,
}

#[instrument(skip_all)]
pub fn assess_data_quality(
    data: &ExtractedInputData,
    inconsistencies: &[Inconsistency],
) -> DataQuality {
    let factors = vec![
        QualityFactor { name: "sohReal", present: data.soh_real.is_some(), points: 20 },
        QualityFactor { name: "ahAccumulated", present: data.ah_accumulated.is_some(), points: 20 },
        QualityFactor { name: "cyclesReported", present: data.cycles_reported.is_some(), points: 15 },
        QualityFactor {
            name: "manufactureDate",
            present: data.manufacture_date.is_some(),
            points: 15,
        },
        QualityFactor { name: "cellVoltages", present: !data.cell_voltages.is_empty(), points: 10 },
        QualityFactor {
            name: "cellTemperatures",
            present: !data.cell_temperatures.is_empty(),
            points: 10,
        },
    ];
    let score: u32 =
        factors.iter().filter(|factor| factor.present).map(|factor| factor.points).sum();
    let penalty: u32 = inconsistencies
        .iter()
        .map(|inconsistency| match inconsistency.severity {
            Severity::Critical => CRITICAL_PENALTY,
            Severity::Warning => WARNING_PENALTY,
            Severity::Info => 0,
        })
        .sum();
    let score = score.saturating_sub(penalty);
    let rating = QualityRating::from_score(score);
    info!(score, %rating, "assessed the data quality");
    DataQuality { score, rating, description: rating.description(), factors }
}
