//! Usage pattern detection: UPS standby, solar cycling, or a switch from the former to the latter.

use serde::Serialize;

use crate::{
    analysis::extract::ExtractedInputData,
    config::HealthConfig,
    prelude::*,
    quantity::AmpereHours,
};

/// More discharge events per cycle than this means a long UPS history before cycling.
const HYBRID_EVENT_TO_CYCLE_RATIO: f64 = 3.0;

/// Shallow discharges: below this throughput per cycle the pack backs up a load.
const UPS_MAX_AH_PER_CYCLE: f64 = 30.0;

/// Deep daily discharges: above this throughput per cycle the pack stores solar energy.
const SOLAR_MIN_AH_PER_CYCLE: f64 = 80.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum UsageType {
    #[display("unknown")]
    Unknown,

    #[display("UPS")]
    Ups,

    #[display("solar")]
    Solar,

    #[display("hybrid")]
    Hybrid,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum PhasePeriod {
    #[display("historical")]
    Historical,

    #[display("current")]
    Current,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePhase {
    #[serde(rename = "type")]
    pub usage_type: UsageType,

    /// Discharge events for a UPS phase, cycles for a solar phase.
    pub event_or_cycle_count: u32,

    pub estimated_ah_contribution: AmpereHours,
    pub period: PhasePeriod,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePattern {
    #[serde(rename = "type")]
    pub usage_type: UsageType,

    pub has_pattern_change: bool,

    /// Only populated when a pattern change has been detected.
    pub phases: Vec<UsagePhase>,

    pub current_phase: Option<UsageType>,

    /// `0..=1`
    pub confidence: f64,

    pub event_to_cycle_ratio: Option<f64>,
    pub ah_per_cycle: Option<f64>,
}

impl UsagePattern {
    pub const fn unknown() -> Self {
        Self {
            usage_type: UsageType::Unknown,
            has_pattern_change: false,
            phases: Vec::new(),
            current_phase: None,
            confidence: 0.0,
            event_to_cycle_ratio: None,
            ah_per_cycle: None,
        }
    }

    #[must_use]
    pub fn phase(&self, usage_type: UsageType) -> Option<&UsagePhase> {
        self.phases.iter().find(|phase| phase.usage_type == usage_type)
    }
}

#[instrument(skip_all)]
pub fn detect_usage_pattern(config: &HealthConfig, data: &ExtractedInputData) -> UsagePattern {
    let (Some(cycles), Some(events), Some(ah_accumulated)) =
        (data.cycles_reported, data.discharge_event_count, data.ah_accumulated)
    else {
        debug!("not enough counters to detect the usage pattern");
        return UsagePattern::unknown();
    };
    if cycles == 0 {
        debug!("no cycles reported yet");
        return UsagePattern::unknown();
    }

    let event_to_cycle_ratio = f64::from(events) / f64::from(cycles);
    let ah_per_cycle = ah_accumulated.0 / f64::from(cycles);
    let mut pattern = UsagePattern {
        event_to_cycle_ratio: Some(event_to_cycle_ratio),
        ah_per_cycle: Some(ah_per_cycle),
        ..UsagePattern::unknown()
    };

    if event_to_cycle_ratio > HYBRID_EVENT_TO_CYCLE_RATIO {
        let ups_events = events.saturating_sub(cycles);
        pattern.usage_type = UsageType::Hybrid;
        pattern.has_pattern_change = true;
        pattern.phases = vec![
            UsagePhase {
                usage_type: UsageType::Ups,
                event_or_cycle_count: ups_events,
                estimated_ah_contribution: AmpereHours(
                    f64::from(ups_events) * config.ups_ah_per_event,
                ),
                period: PhasePeriod::Historical,
            },
            UsagePhase {
                usage_type: UsageType::Solar,
                event_or_cycle_count: cycles,
                estimated_ah_contribution: AmpereHours(
                    f64::from(cycles) * config.solar_ah_per_cycle,
                ),
                period: PhasePeriod::Current,
            },
        ];
        pattern.current_phase = Some(UsageType::Solar);
        pattern.confidence = 0.8;
    } else if ah_per_cycle < UPS_MAX_AH_PER_CYCLE {
        pattern.usage_type = UsageType::Ups;
        pattern.current_phase = Some(UsageType::Ups);
        pattern.confidence = 0.7;
    } else if ah_per_cycle > SOLAR_MIN_AH_PER_CYCLE {
        pattern.usage_type = UsageType::Solar;
        pattern.current_phase = Some(UsageType::Solar);
        pattern.confidence = 0.7;
    }

    info!(
        usage_type = %pattern.usage_type,
        event_to_cycle_ratio,
        ah_per_cycle,
        confidence = pattern.confidence,
        "detected the usage pattern",
    );
    pattern
}
