//! Remaining useful life scenarios.

use bon::Builder;
use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::Serialize;

use crate::{
    analysis::{
        extract::ExtractedInputData,
        metrics::{HealthMetrics, MIN_HISTORY_YEARS},
        usage::{UsagePattern, UsageType},
    },
    config::HealthConfig,
    fmt::FormattedYears,
    prelude::*,
};

const CONSERVATIVE_CONFIDENCE: f64 = 0.8;
const OPTIMISTIC_CONFIDENCE: f64 = 0.6;
const REALISTIC_CONFIDENCE: f64 = 0.75;
const CONSERVATIVE_WEIGHT: f64 = 0.7;
const OPTIMISTIC_WEIGHT: f64 = 0.3;

/// Cycle counter must have moved a bit before the cycle rate means anything.
const MIN_CYCLES_FOR_CYCLE_PREDICTION: u32 = 10;

const DAYS_PER_MONTH: f64 = 365.25 / 12.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    /// Current yearly loss of the estimated state of health, extrapolated linearly.
    #[display("degradation rate")]
    DegradationRate,

    /// Remaining cycles at the solar cycling rate.
    #[display("remaining cycles")]
    RemainingCycles,

    /// Weighted blend of the other two.
    #[display("weighted blend")]
    WeightedBlend,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub years: f64,

    /// `0..=1`
    pub confidence: f64,

    pub method: PredictionMethod,
    pub end_date: DateTime<Utc>,
}

#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Predictions {
    pub conservative: Option<Prediction>,
    pub optimistic: Option<Prediction>,
    pub realistic: Option<Prediction>,
}

#[instrument(skip_all)]
pub fn calculate_life_predictions(
    config: &HealthConfig,
    data: &ExtractedInputData,
    metrics: &HealthMetrics,
    usage_pattern: &UsagePattern,
    now: DateTime<Utc>,
) -> Predictions {
    let conservative = conservative_prediction(config, data, metrics, now);
    let optimistic = optimistic_prediction(config, data, usage_pattern, now);
    let realistic = realistic_prediction(conservative.as_ref(), optimistic.as_ref(), now);
    info!(
        conservative = ?conservative.as_ref().map(|it| FormattedYears(it.years)),
        optimistic = ?optimistic.as_ref().map(|it| FormattedYears(it.years)),
        realistic = ?realistic.as_ref().map(|it| FormattedYears(it.years)),
        "calculated the life predictions",
    );
    Predictions { conservative, optimistic, realistic }
}

/// Extrapolate the current degradation rate until the minimal useful state of health.
fn conservative_prediction(
    config: &HealthConfig,
    data: &ExtractedInputData,
    metrics: &HealthMetrics,
    now: DateTime<Utc>,
) -> Option<Prediction> {
    let age_years = data.age_years.filter(|age_years| *age_years > MIN_HISTORY_YEARS)?;
    let rate = (100.0 - metrics.soh_estimated.0) / age_years;
    let headroom = metrics.soh_estimated.0 - config.min_useful_soh;
    if rate <= 0.0 || headroom <= 0.0 {
        debug!(rate, headroom, "no conservative prediction");
        return None;
    }
    let years = headroom / rate;
    Some(Prediction {
        years,
        confidence: CONSERVATIVE_CONFIDENCE,
        method: PredictionMethod::DegradationRate,
        end_date: add_years(now, years),
    })
}

/// Remaining cycles divided by the yearly cycles of the solar phase.
fn optimistic_prediction(
    config: &HealthConfig,
    data: &ExtractedInputData,
    usage_pattern: &UsagePattern,
    now: DateTime<Utc>,
) -> Option<Prediction> {
    if usage_pattern.current_phase != Some(UsageType::Solar) {
        return None;
    }
    let cycles = data.cycles_reported.filter(|cycles| *cycles > MIN_CYCLES_FOR_CYCLE_PREDICTION)?;
    let remaining_cycles = f64::from(config.expected_cycles_eol) - f64::from(cycles);
    if remaining_cycles <= 0.0 {
        debug!(cycles, "the cycle budget is exhausted");
        return None;
    }
    let cycles_per_year = usage_pattern
        .phase(UsageType::Solar)
        .map(|phase| f64::from(phase.event_or_cycle_count))
        .filter(|cycles_per_year| *cycles_per_year > 0.0)
        .unwrap_or(config.default_solar_cycles_per_year);
    let years = remaining_cycles / cycles_per_year;
    Some(Prediction {
        years,
        confidence: OPTIMISTIC_CONFIDENCE,
        method: PredictionMethod::RemainingCycles,
        end_date: add_years(now, years),
    })
}

/// Blend both scenarios, or fall back to whichever one exists.
pub fn realistic_prediction(
    conservative: Option<&Prediction>,
    optimistic: Option<&Prediction>,
    now: DateTime<Utc>,
) -> Option<Prediction> {
    match (conservative, optimistic) {
        (Some(conservative), Some(optimistic)) => {
            let years =
                CONSERVATIVE_WEIGHT * conservative.years + OPTIMISTIC_WEIGHT * optimistic.years;
            Some(Prediction {
                years,
                confidence: REALISTIC_CONFIDENCE,
                method: PredictionMethod::WeightedBlend,
                end_date: add_years(now, years),
            })
        }
        (Some(single), None) | (None, Some(single)) => Some(single.clone()),
        (None, None) => None,
    }
}

/// Calendar addition: whole months first, the rest of a month as days.
#[must_use]
#[expect(clippy::cast_possible_truncation)]
#[expect(clippy::cast_sign_loss)]
pub fn add_years(now: DateTime<Utc>, years: f64) -> DateTime<Utc> {
    if !years.is_finite() || years <= 0.0 {
        return now;
    }
    let months = years * 12.0;
    let whole_months = months.trunc();
    let seconds = ((months - whole_months) * DAYS_PER_MONTH * 86400.0).round() as i64;
    now.checked_add_months(Months::new(whole_months.min(f64::from(u32::MAX)) as u32))
        .and_then(|date| date.checked_add_signed(TimeDelta::seconds(seconds)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
