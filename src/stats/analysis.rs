use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

use crate::storage::entities::LogEntry;

use super::Period;

/// Goal applied when the user never configured one.
pub const DEFAULT_MONTHLY_GOAL: u32 = 200;

pub const NO_TRIGGER: &str = "None";

/// Number of trend days needed before a week-over-week figure is shown.
const WEEK_COMPARISON_DAYS: usize = 14;

#[derive(Debug, PartialEq, Eq)]
pub struct TriggerCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Returns per-trigger counts sorted by count descending. Ties keep the
/// order triggers were first encountered in the log.
pub fn trigger_breakdown(logs: &[LogEntry]) -> Vec<TriggerCount> {
    let mut index = HashMap::<&str, usize>::new();
    let mut counts: Vec<TriggerCount> = Vec::new();

    for log in logs {
        match index.get(log.trigger.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(&log.trigger, counts.len());
                counts.push(TriggerCount {
                    name: log.trigger.clone(),
                    count: 1,
                });
            }
        }
    }

    // stable sort preserves first-encountered order between equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn top_trigger(breakdown: &[TriggerCount]) -> &str {
    breakdown.first().map_or(NO_TRIGGER, |t| t.name.as_str())
}

/// One data point per calendar day for the selector's trend window, oldest
/// first. Counts run over the whole log, not the period-filtered slice, and
/// days without events appear explicitly with a zero.
pub fn daily_trend(logs: &[LogEntry], period: Period, today: NaiveDate) -> Vec<DailyCount> {
    let mut per_day = HashMap::<NaiveDate, usize>::new();
    for log in logs {
        *per_day.entry(log.date).or_default() += 1;
    }

    let days = period.trend_days();
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            DailyCount {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Mean events per day in the window. For `all` the denominator is the
/// number of distinct dates present in the log (at least 1).
pub fn daily_average(filtered: &[LogEntry], period: Period, all_logs: &[LogEntry]) -> f64 {
    if filtered.is_empty() {
        return 0.0;
    }

    let days = match period.window_days() {
        Some(days) => days as usize,
        None => all_logs
            .iter()
            .map(|l| l.date)
            .collect::<HashSet<_>>()
            .len()
            .max(1),
    };

    filtered.len() as f64 / days as f64
}

/// Entries on or after the first day of the month `today` falls in.
pub fn month_to_date_count(logs: &[LogEntry], today: NaiveDate) -> usize {
    let month_start = today.with_day(1).unwrap_or(today);
    logs.iter().filter(|l| l.date >= month_start).count()
}

/// Stored goal with the unset sentinel resolved.
pub fn effective_goal(stored: u32) -> u32 {
    if stored == 0 {
        DEFAULT_MONTHLY_GOAL
    } else {
        stored
    }
}

/// Percentage of the monthly cap already consumed, clamped to `[0, 100]`.
/// A zero goal yields zero progress rather than a division error.
pub fn goal_progress(month_to_date: usize, monthly_goal: u32) -> u32 {
    if monthly_goal == 0 {
        return 0;
    }
    let percent = (month_to_date as f64 / monthly_goal as f64 * 100.0).round() as u32;
    percent.min(100)
}

/// Percent change of the latest 7 daily counts against the preceding 7.
/// `None` until the trend covers two full weeks; 0 when the previous week
/// had no events.
pub fn week_over_week(trend: &[DailyCount]) -> Option<i32> {
    if trend.len() < WEEK_COMPARISON_DAYS {
        return None;
    }

    let mean = |days: &[DailyCount]| {
        days.iter().map(|d| d.count).sum::<usize>() as f64 / days.len() as f64
    };
    let recent = mean(&trend[trend.len() - 7..]);
    let previous = mean(&trend[trend.len() - 14..trend.len() - 7]);

    if previous > 0.0 {
        Some(((recent - previous) / previous * 100.0).round() as i32)
    } else {
        Some(0)
    }
}

/// Elapsed time since the newest entry, by timestamp rather than day bucket.
pub fn time_since_last(logs: &[LogEntry], now: DateTime<Local>) -> Option<Duration> {
    logs.iter().map(|l| l.timestamp).max().map(|last| now - last)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    fn entry(trigger: &str, date: NaiveDate) -> LogEntry {
        let at = Local
            .from_local_datetime(&date.and_hms_opt(9, 0, 0).unwrap())
            .unwrap();
        LogEntry::new(trigger, at)
    }

    fn entries(counts: &[(&str, usize)]) -> Vec<LogEntry> {
        let mut logs = vec![];
        for (trigger, count) in counts {
            for _ in 0..*count {
                logs.push(entry(trigger, TODAY));
            }
        }
        logs
    }

    #[test]
    fn test_breakdown_sorts_descending_with_stable_ties() {
        let mut logs = entries(&[("Boredom", 1), ("Stress", 3), ("Coffee", 1)]);
        logs.push(entry("Coffee", TODAY));

        let breakdown = trigger_breakdown(&logs);

        assert_eq!(breakdown[0].name, "Stress");
        assert_eq!(breakdown[1].name, "Coffee");
        assert_eq!(breakdown[1].count, 2);
        // tie between nothing left; counts must sum to the input size
        assert_eq!(breakdown.iter().map(|t| t.count).sum::<usize>(), logs.len());
    }

    #[test]
    fn test_breakdown_tie_keeps_first_encountered_order() {
        let logs = entries(&[("Driving", 2), ("Social", 2), ("Stress", 2)]);
        let breakdown = trigger_breakdown(&logs);
        let names: Vec<_> = breakdown.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Driving", "Social", "Stress"]);
    }

    #[test]
    fn test_top_trigger_sentinel_on_empty() {
        assert_eq!(top_trigger(&trigger_breakdown(&[])), NO_TRIGGER);
    }

    #[test]
    fn test_trend_always_fills_the_window() {
        let logs = vec![
            entry("Stress", TODAY),
            entry("Stress", TODAY),
            entry("Coffee", TODAY - Duration::days(3)),
        ];

        let trend = daily_trend(&logs, Period::Week, TODAY);

        assert_eq!(trend.len(), 7);
        assert_eq!(trend[6], DailyCount { date: TODAY, count: 2 });
        assert_eq!(
            trend[3],
            DailyCount {
                date: TODAY - Duration::days(3),
                count: 1
            }
        );
        // untouched days come back as explicit zeros
        assert_eq!(trend.iter().filter(|d| d.count == 0).count(), 5);
        // oldest first
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_trend_window_size_per_period() {
        assert_eq!(daily_trend(&[], Period::Week, TODAY).len(), 7);
        assert_eq!(daily_trend(&[], Period::Month, TODAY).len(), 30);
        assert_eq!(daily_trend(&[], Period::All, TODAY).len(), 90);
    }

    #[test]
    fn test_daily_average_by_window() {
        let logs = entries(&[("Stress", 14)]);
        assert_eq!(daily_average(&logs, Period::Week, &logs), 2.0);

        // `all` divides by distinct dates
        let spread = vec![
            entry("Stress", TODAY),
            entry("Stress", TODAY),
            entry("Stress", TODAY - Duration::days(1)),
            entry("Stress", TODAY - Duration::days(2)),
        ];
        let average = daily_average(&spread, Period::All, &spread);
        assert!((average - 4.0 / 3.0).abs() < 1e-9);

        assert_eq!(daily_average(&[], Period::Week, &[]), 0.0);
    }

    #[test]
    fn test_month_to_date_ignores_previous_month() {
        let logs = vec![
            entry("Stress", TODAY),
            entry("Stress", NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()),
            entry("Stress", NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()),
        ];
        assert_eq!(month_to_date_count(&logs, TODAY), 2);
    }

    #[test]
    fn test_goal_progress_is_clamped_and_total() {
        assert_eq!(goal_progress(0, 200), 0);
        assert_eq!(goal_progress(50, 200), 25);
        assert_eq!(goal_progress(199, 200), 100); // 99.5 rounds up
        assert_eq!(goal_progress(500, 200), 100);
        assert_eq!(goal_progress(7, 0), 0);
    }

    #[test]
    fn test_effective_goal_substitutes_default() {
        assert_eq!(effective_goal(0), DEFAULT_MONTHLY_GOAL);
        assert_eq!(effective_goal(90), 90);
    }

    #[test]
    fn test_week_over_week_needs_two_weeks() {
        let trend = daily_trend(&[], Period::Week, TODAY);
        assert_eq!(week_over_week(&trend), None);

        let mut logs = vec![];
        // previous week: 2/day, recent week: 1/day
        for offset in 7..14 {
            let date = TODAY - Duration::days(offset);
            logs.push(entry("Stress", date));
            logs.push(entry("Stress", date));
        }
        for offset in 0..7 {
            logs.push(entry("Stress", TODAY - Duration::days(offset)));
        }
        let trend = daily_trend(&logs, Period::Month, TODAY);
        assert_eq!(week_over_week(&trend), Some(-50));
    }

    #[test]
    fn test_week_over_week_zero_previous_week() {
        let logs = vec![entry("Stress", TODAY)];
        let trend = daily_trend(&logs, Period::Month, TODAY);
        assert_eq!(week_over_week(&trend), Some(0));
    }

    #[test]
    fn test_time_since_last_uses_newest_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap();
        let logs = vec![
            LogEntry::new("Stress", now - Duration::hours(5)),
            LogEntry::new("Coffee", now - Duration::hours(2)),
        ];

        assert_eq!(time_since_last(&logs, now), Some(Duration::hours(2)));
        assert_eq!(time_since_last(&[], now), None);
    }

    #[test]
    fn test_everything_is_defined_for_empty_input() {
        assert!(trigger_breakdown(&[]).is_empty());
        assert_eq!(daily_trend(&[], Period::Week, TODAY).len(), 7);
        assert_eq!(daily_average(&[], Period::All, &[]), 0.0);
        assert_eq!(month_to_date_count(&[], TODAY), 0);
        assert_eq!(goal_progress(0, 0), 0);
        assert_eq!(week_over_week(&[]), None);
    }
}
