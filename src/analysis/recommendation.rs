//! Actionable advice derived from the metrics, the predictions and the inconsistencies.

use serde::Serialize;

use crate::{
    analysis::{
        inconsistency::{Inconsistency, InconsistencyKind},
        metrics::HealthMetrics,
        prediction::Predictions,
    },
    config::HealthConfig,
    prelude::*,
};

/// State of health below which the pack is worth watching before it hits the end of life.
const SOH_WATCH_THRESHOLD: f64 = 80.0;

/// Remaining life below which the replacement should be planned.
const PLANNING_HORIZON_YEARS: f64 = 2.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    #[display("critical")]
    Critical,

    #[display("warning")]
    Warning,

    #[display("planning")]
    Planning,

    #[display("calibration")]
    Calibration,

    #[display("maintenance")]
    Maintenance,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub recommendation_type: RecommendationType,

    pub message: String,

    /// Lower is more urgent.
    pub priority: u8,
}

impl Recommendation {
    fn new(recommendation_type: RecommendationType, priority: u8, message: impl Into<String>) -> Self {
        Self { recommendation_type, message: message.into(), priority }
    }
}

#[instrument(skip_all)]
pub fn generate_recommendations(
    config: &HealthConfig,
    metrics: &HealthMetrics,
    predictions: &Predictions,
    inconsistencies: &[Inconsistency],
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let soh_real = metrics.soh_real.0;

    if soh_real < config.min_useful_soh {
        recommendations.push(Recommendation::new(
            RecommendationType::Critical,
            1,
            format!(
                "El SOH ({soh_real:.1}%) está por debajo del {:.0}%: planifique el reemplazo de la batería",
                config.min_useful_soh,
            ),
        ));
    } else if soh_real < SOH_WATCH_THRESHOLD {
        recommendations.push(Recommendation::new(
            RecommendationType::Warning,
            2,
            format!(
                "El SOH ({soh_real:.1}%) se acerca al final de la vida útil: aumente la frecuencia de monitorización",
            ),
        ));
    }

    if let Some(realistic) = &predictions.realistic
        && realistic.years < PLANNING_HORIZON_YEARS
    {
        recommendations.push(Recommendation::new(
            RecommendationType::Planning,
            2,
            format!(
                "Vida útil restante estimada de {:.1} años: presupueste el reemplazo",
                realistic.years,
            ),
        ));
    }

    if inconsistencies.iter().any(|inconsistency| inconsistency.kind == InconsistencyKind::SohMismatch) {
        recommendations.push(Recommendation::new(
            RecommendationType::Calibration,
            3,
            "El SOH reportado no coincide con el estimado: realice un ciclo completo de carga y descarga para recalibrar el BMS",
        ));
    }

    recommendations.push(Recommendation::new(
        RecommendationType::Maintenance,
        4,
        "Mantenga la batería entre 15 °C y 25 °C para maximizar su vida útil",
    ));

    // Stable, so the insertion order is kept within the same priority.
    recommendations.sort_by_key(|recommendation| recommendation.priority);
    debug!(n_recommendations = recommendations.len(), "generated the recommendations");
    recommendations
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        analysis::{
            inconsistency::Severity,
            metrics::{DegradationTrend, HealthStatus, ProgressRatio},
            prediction::{Prediction, PredictionMethod},
        },
        quantity::Percent,
    };

    fn metrics(soh_real: f64) -> HealthMetrics {
        HealthMetrics {
            soh_real: Percent(soh_real),
            soh_estimated: Percent(95.0),
            cyclic_degradation_pct: 5.0,
            calendar_degradation_pct: 0.0,
            ah_per_cycle: None,
            average_dod: None,
            progress_by_ah: ProgressRatio::new(0.0, 1.0),
            progress_by_cycles: None,
            progress_by_age: None,
            health_status: HealthStatus::from_soh(Percent(soh_real)),
            degradation_trend: DegradationTrend::InsufficientHistory,
        }
    }

    fn types(recommendations: &[Recommendation]) -> Vec<RecommendationType> {
        recommendations.iter().map(|recommendation| recommendation.recommendation_type).collect()
    }

    #[test]
    fn healthy_gets_maintenance_only() {
        let recommendations = generate_recommendations(
            &HealthConfig::default(),
            &metrics(95.0),
            &Predictions::default(),
            &[],
        );
        assert_eq!(types(&recommendations), [RecommendationType::Maintenance]);
        assert_eq!(recommendations[0].priority, 4);
    }

    #[test]
    fn worn_out_ok() {
        let recommendations = generate_recommendations(
            &HealthConfig::default(),
            &metrics(65.0),
            &Predictions::default(),
            &[],
        );
        assert_eq!(
            types(&recommendations),
            [RecommendationType::Critical, RecommendationType::Maintenance],
        );
        assert_eq!(recommendations[0].priority, 1);
    }

    #[test]
    fn sorted_by_priority() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let predictions = Predictions {
            realistic: Some(
                Prediction::builder()
                    .years(1.5)
                    .confidence(0.8)
                    .method(PredictionMethod::DegradationRate)
                    .end_date(now)
                    .build(),
            ),
            ..Predictions::default()
        };
        let inconsistencies = [Inconsistency {
            kind: InconsistencyKind::SohMismatch,
            severity: Severity::Warning,
            message: String::new(),
            impact: String::new(),
        }];
        let recommendations = generate_recommendations(
            &HealthConfig::default(),
            &metrics(75.0),
            &predictions,
            &inconsistencies,
        );
        assert_eq!(
            types(&recommendations),
            [
                RecommendationType::Warning,
                RecommendationType::Planning,
                RecommendationType::Calibration,
                RecommendationType::Maintenance,
            ],
        );
        assert_eq!(
            recommendations.iter().map(|recommendation| recommendation.priority).collect::<Vec<_>>(),
            [2, 2, 3, 4],
        );
    }
}
