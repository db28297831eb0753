//! The health analysis pipeline.

use chrono::{DateTime, Utc};

use crate::{
    analysis::{
        chart::build_chart_data,
        extract::{extract_input_data, validate_input_data},
        inconsistency::detect_inconsistencies,
        metrics::calculate_health_metrics,
        prediction::calculate_life_predictions,
        quality::assess_data_quality,
        recommendation::generate_recommendations,
        usage::detect_usage_pattern,
    },
    api::{BatterySnapshot, DeviceInfo, RegisterSnapshot},
    config::HealthConfig,
    error::AnalysisError,
    prelude::*,
    report::HealthReport,
};

pub mod cells;
pub mod chart;
pub mod extract;
pub mod inconsistency;
pub mod metrics;
pub mod prediction;
pub mod quality;
pub mod recommendation;
pub mod usage;

/// Stateless health analysis engine, parametrized by the reference battery.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: HealthConfig,
}

impl Engine {
    pub const fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    /// Analyze the snapshots as of now.
    pub fn analyze_health(
        &self,
        battery: &BatterySnapshot,
        device_info: &DeviceInfo,
        registers: &RegisterSnapshot,
    ) -> Result<HealthReport, AnalysisError> {
        self.analyze_health_at(battery, device_info, registers, Utc::now())
    }

    /// Analyze the snapshots as of the given moment.
    ///
    /// The result depends only on the inputs, so the same `now` produces the same report.
    #[instrument(skip_all, fields(battery_id = %battery.id))]
    pub fn analyze_health_at(
        &self,
        battery: &BatterySnapshot,
        device_info: &DeviceInfo,
        registers: &RegisterSnapshot,
        now: DateTime<Utc>,
    ) -> Result<HealthReport, AnalysisError> {
        let config = &self.config;
        let extracted_data = extract_input_data(config, battery, device_info, registers, now);
        let critical = validate_input_data(&extracted_data).inspect_err(|error| {
            warn!("cannot analyze the battery: {error}");
        })?;

        let usage_pattern = detect_usage_pattern(config, &extracted_data);
        let health_metrics =
            calculate_health_metrics(config, &extracted_data, critical, &usage_pattern);
        let predictions =
            calculate_life_predictions(config, &extracted_data, &health_metrics, &usage_pattern, now);
        let inconsistencies = detect_inconsistencies(&extracted_data, &health_metrics);
        let data_quality = assess_data_quality(&extracted_data, &inconsistencies);
        let recommendations =
            generate_recommendations(config, &health_metrics, &predictions, &inconsistencies);
        let chart_data = build_chart_data(config, &extracted_data, &health_metrics, &predictions);

        info!(
            soh_real = ?health_metrics.soh_real,
            soh_estimated = ?health_metrics.soh_estimated,
            usage_type = %usage_pattern.usage_type,
            data_quality = data_quality.score,
            n_inconsistencies = inconsistencies.len(),
            "analyzed the battery health",
        );
        Ok(HealthReport {
            battery_id: extracted_data.battery_id.clone(),
            extracted_data,
            usage_pattern,
            health_metrics,
            predictions,
            inconsistencies,
            data_quality,
            recommendations,
            chart_data,
            timestamp: now,
        })
    }
}
