pub mod analysis;

use std::fmt::Display;

use chrono::{Duration, NaiveDate};
use clap::ValueEnum;

use crate::storage::entities::LogEntry;

/// The user's choice of window for filtering and charting.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Period {
    #[value(name = "7days")]
    Week,
    #[value(name = "30days")]
    Month,
    All,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Week => write!(f, "7days"),
            Period::Month => write!(f, "30days"),
            Period::All => write!(f, "all"),
        }
    }
}

impl Period {
    /// Window length in days; `None` for the unbounded selector.
    pub fn window_days(self) -> Option<u32> {
        match self {
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::All => None,
        }
    }

    /// How many daily data points the trend chart shows for this selector.
    pub fn trend_days(self) -> usize {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::All => 90,
        }
    }
}

/// Entries whose date falls within `[today - N days, today]`, both ends
/// inclusive. `all` passes the log through unfiltered.
pub fn filter_by_period(logs: &[LogEntry], period: Period, today: NaiveDate) -> Vec<LogEntry> {
    let Some(days) = period.window_days() else {
        return logs.to_vec();
    };
    let start = today - Duration::days(days as i64);

    logs.iter()
        .filter(|l| l.date >= start && l.date <= today)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;

    const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    fn entry_days_ago(days: i64) -> LogEntry {
        let date = TODAY - Duration::days(days);
        let at = Local
            .from_local_datetime(&date.and_hms_opt(10, 0, 0).unwrap())
            .unwrap();
        LogEntry::new("Stress", at)
    }

    #[test]
    fn test_filter_keeps_window_edges() {
        let logs = vec![
            entry_days_ago(0),
            entry_days_ago(7),
            entry_days_ago(8),
            entry_days_ago(-1),
        ];

        let filtered = filter_by_period(&logs, Period::Week, TODAY);

        // exactly 7 days ago stays, 8 days ago and tomorrow fall out
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|l| l.date >= TODAY - Duration::days(7)));
        assert!(filtered.iter().all(|l| l.date <= TODAY));
    }

    #[test]
    fn test_all_period_is_unfiltered() {
        let logs = vec![entry_days_ago(0), entry_days_ago(400)];
        assert_eq!(filter_by_period(&logs, Period::All, TODAY), logs);
    }

    #[test]
    fn test_empty_log_filters_to_empty() {
        assert!(filter_by_period(&[], Period::Month, TODAY).is_empty());
    }
}
