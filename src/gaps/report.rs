use std::fmt;

use super::window::{BlockNumber, Window};

/// Cap on how many individual missing numbers are printed per window.
pub const REPORTING_LIMIT: usize = 100;

/// Outcome of evaluating one window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GapReport {
    pub window: Window,
    pub missing_count: i64,
    /// Ascending, empty when the window is complete or was not enumerated.
    pub missing_numbers: Vec<BlockNumber>,
}

impl GapReport {
    pub fn is_complete(&self) -> bool {
        self.missing_count == 0
    }

    pub fn is_fully_missing(&self) -> bool {
        self.missing_count == self.window.size()
    }

    /// Drops missing numbers beyond the reporting limit.
    pub fn truncated(mut self) -> Self {
        self.missing_numbers.truncate(REPORTING_LIMIT);
        self
    }
}

impl fmt::Display for GapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing_numbers = self
            .missing_numbers
            .iter()
            .map(|number| number.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        write!(
            f,
            "GapCount({}) - {}({})",
            self.window, self.missing_count, missing_numbers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_test() {
        let report = GapReport {
            window: Window::from_page(0, 10),
            missing_count: 4,
            missing_numbers: vec![3, 4, 6, 8],
        };

        assert_eq!(report.to_string(), "GapCount(0:10) - 4(3, 4, 6, 8)");
    }

    #[test]
    fn display_complete_window_test() {
        let report = GapReport {
            window: Window::from_page(1, 10_000),
            missing_count: 0,
            missing_numbers: vec![],
        };

        assert!(report.is_complete());
        assert_eq!(report.to_string(), "GapCount(10000:20000) - 0()");
    }

    #[test]
    fn truncated_keeps_count_test() {
        let report = GapReport {
            window: Window::from_page(0, 1_000),
            missing_count: 999,
            missing_numbers: (1..1_000).collect(),
        }
        .truncated();

        assert_eq!(report.missing_count, 999);
        assert_eq!(report.missing_numbers.len(), REPORTING_LIMIT);
        assert_eq!(report.missing_numbers.last(), Some(&100));
        assert!(!report.is_fully_missing());
    }
}
