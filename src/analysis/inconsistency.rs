//! Cross-checks between the reported and the modelled values.

use serde::Serialize;

use crate::{
    analysis::{extract::ExtractedInputData, metrics::HealthMetrics},
    prelude::*,
};

const SOH_MISMATCH_WARNING: f64 = 10.0;
const SOH_MISMATCH_CRITICAL: f64 = 20.0;
const MIN_PLAUSIBLE_DOD: f64 = 0.05;
const MAX_PLAUSIBLE_DOD: f64 = 1.0;

/// Coarse flat aging used for the age sanity check, percent per year.
///
/// Deliberately independent of the calendar aging model.
const FLAT_AGING_PER_YEAR: f64 = 2.0;
const AGE_MISMATCH_TOLERANCE: f64 = 10.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyKind {
    #[display("SOH mismatch")]
    SohMismatch,

    #[display("DoD anomaly")]
    DodAnomaly,

    #[display("age/degradation mismatch")]
    AgeDegradationMismatch,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[display("info")]
    Info,

    #[display("warning")]
    Warning,

    #[display("critical")]
    Critical,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Inconsistency {
    pub kind: InconsistencyKind,
    pub severity: Severity,
    pub message: String,
    pub impact: String,
}

#[instrument(skip_all)]
pub fn detect_inconsistencies(
    data: &ExtractedInputData,
    metrics: &HealthMetrics,
) -> Vec<Inconsistency> {
    let mut inconsistencies = Vec::new();

    let soh_difference = (metrics.soh_real.0 - metrics.soh_estimated.0).abs();
    if soh_difference > SOH_MISMATCH_WARNING {
        inconsistencies.push(Inconsistency {
            kind: InconsistencyKind::SohMismatch,
            severity: if soh_difference > SOH_MISMATCH_CRITICAL {
                Severity::Critical
            } else {
                Severity::Warning
            },
            message: format!(
                "El SOH reportado por el BMS ({:.1}%) difiere {soh_difference:.1} puntos del estimado ({:.1}%)",
                metrics.soh_real.0, metrics.soh_estimated.0,
            ),
            impact: "Las predicciones de vida útil pueden ser imprecisas".to_string(),
        });
    }

    if let Some(average_dod) = metrics.average_dod
        && !(MIN_PLAUSIBLE_DOD..=MAX_PLAUSIBLE_DOD).contains(&average_dod)
    {
        inconsistencies.push(Inconsistency {
            kind: InconsistencyKind::DodAnomaly,
            severity: Severity::Warning,
            message: format!(
                "Profundidad de descarga media atípica: {:.1}% por ciclo",
                average_dod * 100.0,
            ),
            impact: "El contador de ciclos o de Ah acumulados puede ser incorrecto".to_string(),
        });
    }

    if let Some(age_years) = data.age_years
        && age_years > 1.0
    {
        let reported_degradation = 100.0 - metrics.soh_real.0;
        let expected_degradation = age_years * FLAT_AGING_PER_YEAR;
        if (reported_degradation - expected_degradation).abs() > AGE_MISMATCH_TOLERANCE {
            inconsistencies.push(Inconsistency {
                kind: InconsistencyKind::AgeDegradationMismatch,
                severity: Severity::Info,
                message: format!(
                    "Degradación de {reported_degradation:.1}% tras {age_years:.1} años, se esperaba alrededor de {expected_degradation:.1}%",
                ),
                impact: "El uso real difiere del perfil típico para esta edad".to_string(),
            });
        }
    }

    for inconsistency in &inconsistencies {
        warn!(kind = %inconsistency.kind, severity = %inconsistency.severity, "{}", inconsistency.message);
    }
    inconsistencies
}
