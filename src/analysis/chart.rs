//! Chart-ready series for the dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    analysis::{
        cells::CellSummary,
        extract::ExtractedInputData,
        metrics::{HealthMetrics, HealthStatus, calendar_degradation, cyclic_degradation, estimated_soh},
        prediction::{Prediction, Predictions},
    },
    config::HealthConfig,
    prelude::*,
    quantity::Percent,
};

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub gauge_data: GaugeData,
    pub degradation_curve: DegradationCurve,
    pub comparison_data: ComparisonData,
    pub predictions_data: Vec<PredictionBar>,
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeData {
    pub soh_real: Percent,
    pub soh_estimated: Percent,
    pub health_status: HealthStatus,
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct CurvePoint {
    pub year: f64,
    pub soh: Percent,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DegradationCurve {
    /// Modelled state of health for each whole year of the expected life.
    pub theoretical: Vec<CurvePoint>,

    /// Where the pack is now, if its age is known.
    pub current: Option<CurvePoint>,
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ProgressBar {
    pub label: &'static str,

    /// `0..=1`
    pub percentage: f64,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonData {
    pub soh_real: Percent,
    pub soh_estimated: Percent,

    /// Real minus estimated.
    pub difference: f64,

    pub progress: Vec<ProgressBar>,
    pub cells: Option<CellSummary>,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionBar {
    pub scenario: &'static str,
    pub years: f64,
    pub confidence: f64,
    pub end_date: DateTime<Utc>,
}

impl PredictionBar {
    fn new(scenario: &'static str, prediction: &Prediction) -> Self {
        Self {
            scenario,
            years: prediction.years,
            confidence: prediction.confidence,
            end_date: prediction.end_date,
        }
    }
}

#[instrument(skip_all)]
pub fn build_chart_data(
    config: &HealthConfig,
    data: &ExtractedInputData,
    metrics: &HealthMetrics,
    predictions: &Predictions,
) -> ChartData {
    let chart_data = ChartData {
        gauge_data: GaugeData {
            soh_real: metrics.soh_real,
            soh_estimated: metrics.soh_estimated,
            health_status: metrics.health_status,
        },
        degradation_curve: degradation_curve(config, data.age_years, metrics),
        comparison_data: ComparisonData {
            soh_real: metrics.soh_real,
            soh_estimated: metrics.soh_estimated,
            difference: metrics.soh_real.0 - metrics.soh_estimated.0,
            progress: [
                Some(("Ah", metrics.progress_by_ah)),
                metrics.progress_by_cycles.map(|progress| ("Ciclos", progress)),
                metrics.progress_by_age.map(|progress| ("Edad", progress)),
            ]
            .into_iter()
            .flatten()
            .map(|(label, progress)| ProgressBar { label, percentage: progress.percentage })
            .collect(),
            cells: CellSummary::try_from_data(data),
        },
        predictions_data: [
            ("Conservador", predictions.conservative.as_ref()),
            ("Optimista", predictions.optimistic.as_ref()),
            ("Realista", predictions.realistic.as_ref()),
        ]
        .into_iter()
        .filter_map(|(scenario, prediction)| Some(PredictionBar::new(scenario, prediction?)))
        .collect(),
    };
    debug!(
        n_curve_points = chart_data.degradation_curve.theoretical.len(),
        n_prediction_bars = chart_data.predictions_data.len(),
        "built the chart data",
    );
    chart_data
}

/// Re-run the degradation model over the expected life.
///
/// The throughput progress grows at the pack's observed pace when it is known,
/// and evenly over the expected life otherwise.
fn degradation_curve(
    config: &HealthConfig,
    age_years: Option<f64>,
    metrics: &HealthMetrics,
) -> DegradationCurve {
    let observed_pace = age_years
        .filter(|age_years| *age_years > 0.0)
        .map(|age_years| metrics.progress_by_ah.percentage / age_years)
        .filter(|pace| *pace > 0.0);
    let pace = observed_pace.unwrap_or(1.0 / config.expected_life_years);

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let last_year = config.expected_life_years.ceil().max(0.0) as u32;
    let theoretical = (0..=last_year)
        .map(f64::from)
        .map(|year| {
            let progress = (pace * year).min(1.0);
            let soh = estimated_soh(
                config,
                cyclic_degradation(config, progress),
                calendar_degradation(config, year),
            );
            CurvePoint { year, soh }
        })
        .collect();
    let current = age_years.map(|year| CurvePoint { year, soh: metrics.soh_estimated });
    DegradationCurve { theoretical, current }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;
    use crate::{
        analysis::{
            metrics::{DegradationTrend, ProgressRatio},
            prediction::PredictionMethod,
        },
        quantity::Volts,
    };

    fn metrics(progress_by_ah: f64, age_years: Option<f64>) -> HealthMetrics {
        HealthMetrics {
            soh_real: Percent(92.0),
            soh_estimated: Percent(94.0),
            cyclic_degradation_pct: 5.0,
            calendar_degradation_pct: 4.0,
            ah_per_cycle: None,
            average_dod: None,
            progress_by_ah: ProgressRatio::new(progress_by_ah, 1.0),
            progress_by_cycles: None,
            progress_by_age: age_years.map(|age_years| ProgressRatio::new(age_years, 15.0)),
            health_status: HealthStatus::Excellent,
            degradation_trend: DegradationTrend::Normal,
        }
    }

    #[test]
    fn curve_without_age() {
        let config = HealthConfig::default();
        let curve = degradation_curve(&config, None, &metrics(0.1, None));
        assert_eq!(curve.theoretical.len(), 16);
        assert_eq!(curve.current, None);

        let first = curve.theoretical[0];
        assert_abs_diff_eq!(first.year, 0.0);
        assert_abs_diff_eq!(first.soh.0, 100.0);

        // Full expected life: cyclic 30 + calendar 20 × 0.25.
        let last = curve.theoretical[15];
        assert_abs_diff_eq!(last.year, 15.0);
        assert_abs_diff_eq!(last.soh.0, 65.0, epsilon = 1e-9);
    }

    #[test]
    fn curve_follows_observed_pace() {
        let config = HealthConfig::default();
        let curve = degradation_curve(&config, Some(2.0), &metrics(0.1, Some(2.0)));
        assert_eq!(curve.current, Some(CurvePoint { year: 2.0, soh: Percent(94.0) }));

        // Year 2: progress 0.1 ⇒ cyclic 1, calendar 2 × 1.5 × 0.8 = 2.4 ⇒ 100 − (1 + 0.6).
        assert_abs_diff_eq!(curve.theoretical[2].soh.0, 98.4, epsilon = 1e-9);
    }

    #[test]
    fn curve_is_non_increasing() {
        let config = HealthConfig::default();
        let curve = degradation_curve(&config, Some(3.0), &metrics(0.3, Some(3.0)));
        assert!(curve.theoretical.windows(2).all(|pair| pair[1].soh <= pair[0].soh));
    }

    #[test]
    fn chart_data_ok() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let data = ExtractedInputData::builder()
            .battery_id(1_u64)
            .age_years(2.0)
            .cell_voltages(vec![Volts(3.3), Volts(3.31)])
            .build();
        let predictions = Predictions {
            conservative: Some(
                Prediction::builder()
                    .years(4.0)
                    .confidence(0.8)
                    .method(PredictionMethod::DegradationRate)
                    .end_date(now)
                    .build(),
            ),
            ..Predictions::default()
        };
        let chart_data =
            build_chart_data(&HealthConfig::default(), &data, &metrics(0.1, Some(2.0)), &predictions);

        assert_abs_diff_eq!(chart_data.comparison_data.difference, -2.0);
        assert_eq!(
            chart_data.comparison_data.progress.iter().map(|bar| bar.label).collect::<Vec<_>>(),
            ["Ah", "Edad"],
        );
        assert_eq!(chart_data.comparison_data.cells.map(|cells| cells.n_cells), Some(2));
        assert_eq!(chart_data.predictions_data.len(), 1);
        assert_eq!(chart_data.predictions_data[0].scenario, "Conservador");
    }
}
