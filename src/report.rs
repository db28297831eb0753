//! The analysis report and its wire envelope.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    analysis::{
        chart::ChartData,
        extract::ExtractedInputData,
        inconsistency::Inconsistency,
        metrics::HealthMetrics,
        prediction::Predictions,
        quality::DataQuality,
        recommendation::Recommendation,
        usage::UsagePattern,
    },
    api::BatteryId,
    error::AnalysisError,
};

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub extracted_data: ExtractedInputData,
    pub usage_pattern: UsagePattern,
    pub health_metrics: HealthMetrics,
    pub predictions: Predictions,
    pub inconsistencies: Vec<Inconsistency>,
    pub data_quality: DataQuality,
    pub recommendations: Vec<Recommendation>,
    pub chart_data: ChartData,
    pub timestamp: DateTime<Utc>,
    pub battery_id: BatteryId,
}

/// `{"status": "success", ...}` or `{"status": "error", "message": ...}`.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Success(Box<HealthReport>),
    Error { message: String },
}

impl From<Result<HealthReport, AnalysisError>> for AnalysisOutcome {
    fn from(result: Result<HealthReport, AnalysisError>) -> Self {
        match result {
            Ok(report) => Self::Success(Box::new(report)),
            Err(error) => Self::Error { message: error.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_envelope_ok() -> crate::prelude::Result {
        let outcome =
            AnalysisOutcome::from(Err(AnalysisError::MissingCriticalData { field: "sohReal" }));
        assert_eq!(
            serde_json::to_value(&outcome)?,
            json!({
                "status": "error",
                "message": "missing critical data: `sohReal` is not available",
            }),
        );
        Ok(())
    }
}
