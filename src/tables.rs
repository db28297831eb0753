use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use lifepo4_health::{
    HealthReport,
    analysis::{
        inconsistency::{Inconsistency, Severity},
        metrics::HealthStatus,
        prediction::Predictions,
        quality::QualityRating,
        recommendation::{Recommendation, RecommendationType},
    },
    fmt::{FormattedPercentage, FormattedYears},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn optional<T: ToString>(value: Option<T>) -> Cell {
    value.map_or_else(
        || Cell::new("n/a").add_attribute(Attribute::Dim),
        |value| Cell::new(value.to_string()),
    )
}

const fn status_color(status: HealthStatus) -> Color {
    match status {
        HealthStatus::Excellent | HealthStatus::Good => Color::Green,
        HealthStatus::Fair => Color::DarkYellow,
        HealthStatus::Poor | HealthStatus::Critical => Color::Red,
    }
}

pub fn build_summary_table(report: &HealthReport) -> Table {
    let data = &report.extracted_data;
    let metrics = &report.health_metrics;
    let quality = &report.data_quality;

    let mut table = new_table();
    table.set_header(vec!["Battery", "Value"]);
    table.add_row(vec![Cell::new("ID"), Cell::new(&report.battery_id)]);
    table.add_row(vec![Cell::new("Model"), optional(data.model.as_deref())]);
    table.add_row(vec![Cell::new("Serial number"), optional(data.serial_number.as_deref())]);
    table.add_row(vec![Cell::new("Manufactured"), optional(data.manufacture_date)]);
    table.add_row(vec![
        Cell::new("Age"),
        optional(data.age_years.map(FormattedYears)),
    ]);
    table.add_row(vec![
        Cell::new("SOH (reported)"),
        Cell::new(format!("{:.1}", metrics.soh_real))
            .fg(status_color(metrics.health_status))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("SOH (estimated)"),
        Cell::new(format!("{:.1}", metrics.soh_estimated)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Status"),
        Cell::new(metrics.health_status).fg(status_color(metrics.health_status)),
    ]);
    table.add_row(vec![Cell::new("Trend"), Cell::new(metrics.degradation_trend)]);
    table.add_row(vec![
        Cell::new("Usage"),
        Cell::new(format!(
            "{} ({})",
            report.usage_pattern.usage_type,
            FormattedPercentage(report.usage_pattern.confidence),
        )),
    ]);
    table.add_row(vec![
        Cell::new("Progress by Ah"),
        Cell::new(FormattedPercentage(metrics.progress_by_ah.percentage)),
    ]);
    table.add_row(vec![
        Cell::new("Progress by cycles"),
        optional(metrics.progress_by_cycles.map(|progress| FormattedPercentage(progress.percentage))),
    ]);
    table.add_row(vec![
        Cell::new("Data quality"),
        Cell::new(format!("{} ({})", quality.score, quality.rating)).fg(match quality.rating {
            QualityRating::Excellent | QualityRating::Good => Color::Green,
            QualityRating::Fair => Color::DarkYellow,
            QualityRating::Poor => Color::Red,
        }),
    ]);
    table
}

pub fn build_predictions_table(predictions: &Predictions) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Scenario", "Remaining", "End of life", "Confidence", "Method"]);
    for (scenario, prediction) in [
        ("Conservative", &predictions.conservative),
        ("Optimistic", &predictions.optimistic),
        ("Realistic", &predictions.realistic),
    ] {
        match prediction {
            Some(prediction) => table.add_row(vec![
                Cell::new(scenario),
                Cell::new(FormattedYears(prediction.years)).set_alignment(CellAlignment::Right),
                Cell::new(prediction.end_date.format("%Y-%m-%d")),
                Cell::new(FormattedPercentage(prediction.confidence))
                    .set_alignment(CellAlignment::Right),
                Cell::new(prediction.method).add_attribute(Attribute::Dim),
            ]),
            None => table.add_row(vec![
                Cell::new(scenario),
                Cell::new("not enough data").add_attribute(Attribute::Dim),
            ]),
        };
    }
    table
}

pub fn build_findings_table(
    inconsistencies: &[Inconsistency],
    recommendations: &[Recommendation],
) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Kind", "Level", "Message"]);
    for inconsistency in inconsistencies {
        table.add_row(vec![
            Cell::new(inconsistency.kind),
            Cell::new(inconsistency.severity).fg(match inconsistency.severity {
                Severity::Info => Color::Blue,
                Severity::Warning => Color::DarkYellow,
                Severity::Critical => Color::Red,
            }),
            Cell::new(format!("{}\n{}", inconsistency.message, inconsistency.impact)),
        ]);
    }
    for recommendation in recommendations {
        table.add_row(vec![
            Cell::new(recommendation.recommendation_type),
            Cell::new(recommendation.priority)
                .fg(match recommendation.recommendation_type {
                    RecommendationType::Critical => Color::Red,
                    RecommendationType::Warning | RecommendationType::Planning => {
                        Color::DarkYellow
                    }
                    RecommendationType::Calibration => Color::Blue,
                    RecommendationType::Maintenance => Color::Green,
                })
                .set_alignment(CellAlignment::Right),
            Cell::new(&recommendation.message),
        ]);
    }
    table
}
