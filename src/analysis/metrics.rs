//! Health metrics and the degradation model.

use serde::Serialize;

use crate::{
    analysis::{
        extract::{CriticalData, ExtractedInputData},
        usage::UsagePattern,
    },
    config::HealthConfig,
    fmt::FormattedPercentage,
    prelude::*,
    quantity::Percent,
};

/// Minimal history needed to talk about a degradation rate.
pub const MIN_HISTORY_YEARS: f64 = 0.5;

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ProgressRatio {
    pub current: f64,
    pub total: f64,

    /// `current / total`, capped at 1.
    pub percentage: f64,
}

impl ProgressRatio {
    pub fn new(current: f64, total: f64) -> Self {
        let percentage = if total > 0.0 { (current / total).min(1.0) } else { 0.0 };
        Self { current, total, percentage }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
pub enum HealthStatus {
    #[serde(rename = "Excelente")]
    #[display("Excelente")]
    Excellent,

    #[serde(rename = "Bueno")]
    #[display("Bueno")]
    Good,

    #[serde(rename = "Regular")]
    #[display("Regular")]
    Fair,

    #[serde(rename = "Deficiente")]
    #[display("Deficiente")]
    Poor,

    #[serde(rename = "Crítico")]
    #[display("Crítico")]
    Critical,
}

impl HealthStatus {
    pub fn from_soh(soh: Percent) -> Self {
        match soh.0 {
            soh if soh >= 90.0 => Self::Excellent,
            soh if soh >= 80.0 => Self::Good,
            soh if soh >= 70.0 => Self::Fair,
            soh if soh >= 50.0 => Self::Poor,
            _ => Self::Critical,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
pub enum DegradationTrend {
    #[serde(rename = "Lenta")]
    #[display("Lenta")]
    Slow,

    #[serde(rename = "Normal")]
    #[display("Normal")]
    Normal,

    #[serde(rename = "Acelerada")]
    #[display("Acelerada")]
    Accelerated,

    #[serde(rename = "Muy rápida")]
    #[display("Muy rápida")]
    VeryFast,

    #[serde(rename = "Insuficiente historial")]
    #[display("Insuficiente historial")]
    InsufficientHistory,
}

impl DegradationTrend {
    /// Classify by the yearly loss of the estimated state of health.
    pub fn from_age(soh_estimated: Percent, age_years: Option<f64>) -> Self {
        let Some(age_years) = age_years.filter(|age_years| *age_years >= MIN_HISTORY_YEARS) else {
            return Self::InsufficientHistory;
        };
        match (100.0 - soh_estimated.0) / age_years {
            rate if rate < 1.5 => Self::Slow,
            rate if rate < 3.0 => Self::Normal,
            rate if rate < 5.0 => Self::Accelerated,
            _ => Self::VeryFast,
        }
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    pub soh_real: Percent,
    pub soh_estimated: Percent,
    pub cyclic_degradation_pct: f64,
    pub calendar_degradation_pct: f64,
    pub ah_per_cycle: Option<f64>,

    /// Average depth of discharge, `ah_per_cycle` relative to the nominal capacity.
    #[serde(rename = "averageDoD")]
    pub average_dod: Option<f64>,

    pub progress_by_ah: ProgressRatio,
    pub progress_by_cycles: Option<ProgressRatio>,
    pub progress_by_age: Option<ProgressRatio>,
    #[serde(rename = "healthStatusLabel")]
    pub health_status: HealthStatus,

    #[serde(rename = "degradationTrendLabel")]
    pub degradation_trend: DegradationTrend,
}

#[instrument(skip_all)]
pub fn calculate_health_metrics(
    config: &HealthConfig,
    data: &ExtractedInputData,
    critical: CriticalData,
    usage_pattern: &UsagePattern,
) -> HealthMetrics {
    let cycles = data.cycles_reported.filter(|cycles| *cycles > 0).map(f64::from);
    let ah_per_cycle = cycles.map(|cycles| critical.ah_accumulated.0 / cycles);
    let average_dod = ah_per_cycle.map(|ah_per_cycle| ah_per_cycle / config.nominal_capacity_ah);

    let expected_ah = if usage_pattern.has_pattern_change {
        usage_pattern.phases.iter().map(|phase| phase.estimated_ah_contribution.0).sum()
    } else {
        f64::from(config.expected_cycles_eol)
            * config.nominal_capacity_ah
            * average_dod.unwrap_or(config.default_depth_of_discharge)
    };
    let progress_by_ah = ProgressRatio::new(critical.ah_accumulated.0, expected_ah);
    let progress_by_cycles = data
        .cycles_reported
        .map(|cycles| ProgressRatio::new(f64::from(cycles), f64::from(config.expected_cycles_eol)));
    let progress_by_age =
        data.age_years.map(|age_years| ProgressRatio::new(age_years, config.expected_life_years));

    let cyclic_degradation_pct = cyclic_degradation(config, progress_by_ah.percentage);
    let calendar_degradation_pct = calendar_degradation(config, data.age_years.unwrap_or(0.0));
    let soh_estimated = estimated_soh(config, cyclic_degradation_pct, calendar_degradation_pct);

    let metrics = HealthMetrics {
        soh_real: critical.soh_real,
        soh_estimated,
        cyclic_degradation_pct,
        calendar_degradation_pct,
        ah_per_cycle,
        average_dod,
        progress_by_ah,
        progress_by_cycles,
        progress_by_age,
        health_status: HealthStatus::from_soh(critical.soh_real),
        degradation_trend: DegradationTrend::from_age(soh_estimated, data.age_years),
    };
    info!(
        soh_real = ?metrics.soh_real,
        soh_estimated = ?metrics.soh_estimated,
        progress_by_ah = ?FormattedPercentage(progress_by_ah.percentage),
        health_status = %metrics.health_status,
        degradation_trend = %metrics.degradation_trend,
        "calculated the health metrics",
    );
    metrics
}

/// Capacity loss due to throughput, percent.
///
/// Linear up to the knee, quadratic afterwards.
#[must_use]
pub fn cyclic_degradation(config: &HealthConfig, progress: f64) -> f64 {
    let model = &config.cyclic;
    let degradation = if progress <= model.knee_progress {
        progress * model.linear_slope
    } else {
        let excess = (progress - model.knee_progress) * 2.0;
        model.knee_progress * model.linear_slope + excess.powi(2) * model.quadratic_factor
    };
    degradation.min(model.max_degradation)
}

/// Capacity loss due to elapsed time, percent.
#[must_use]
pub fn calendar_degradation(config: &HealthConfig, age_years: f64) -> f64 {
    let model = &config.calendar;
    let degradation = if age_years <= model.early_years {
        age_years * model.rate_per_year * model.early_factor
    } else {
        model.early_years * model.rate_per_year * model.early_factor
            + (age_years - model.early_years) * model.rate_per_year * model.late_factor
    };
    degradation.min(model.max_degradation)
}

/// Estimated state of health, clamped to `0..=100`.
pub fn estimated_soh(config: &HealthConfig, cyclic: f64, calendar: f64) -> Percent {
    Percent((100.0 - (cyclic + calendar * config.calendar.soh_weight)).clamp(0.0, 100.0))
}
