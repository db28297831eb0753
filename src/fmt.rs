use std::fmt::{Debug, Display, Formatter};

/// Proportion `0..=1` displayed as a percentage.
pub struct FormattedPercentage(pub f64);

impl Debug for FormattedPercentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for FormattedPercentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.0)
    }
}

/// Fractional number of years, for example `5.8 y`.
pub struct FormattedYears(pub f64);

impl Debug for FormattedYears {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for FormattedYears {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} y", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_ok() {
        assert_eq!(FormattedPercentage(0.256).to_string(), "25.6%");
    }

    #[test]
    fn years_ok() {
        assert_eq!(FormattedYears(5.8).to_string(), "5.8 y");
    }
}
