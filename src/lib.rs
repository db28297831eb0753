#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod fmt;
pub mod prelude;
pub mod quantity;
pub mod report;

pub use self::{
    analysis::Engine,
    config::HealthConfig,
    error::AnalysisError,
    report::{AnalysisOutcome, HealthReport},
};
