use thiserror::Error;

/// Fatal analysis failure: the report cannot be built from the given readings.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AnalysisError {
    #[error("missing critical data: `{field}` is not available")]
    MissingCriticalData { field: &'static str },

    #[error("`{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_ok() {
        assert_eq!(
            AnalysisError::MissingCriticalData { field: "sohReal" }.to_string(),
            "missing critical data: `sohReal` is not available",
        );
        assert_eq!(
            AnalysisError::OutOfRange { field: "ahAccumulated", value: -1.5 }.to_string(),
            "`ahAccumulated` is out of range: -1.5",
        );
    }
}
