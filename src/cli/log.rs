use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{Duration, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{Parser, ValueEnum};

use crate::logbook;
use crate::stats::analysis;
use crate::storage::cleanup::{cleanup_stats, RETENTION_MONTHS};
use crate::storage::data_access::DataAccess;
use crate::storage::entities::LogEntry;
use crate::utils::clock::Clock;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct LogCommand {
    #[arg(help = "Trigger label, e.g. one from `pufflog triggers list`")]
    trigger: String,
    #[arg(
        long,
        help = "Moment of the event. Examples are \"yesterday 21:00\", \"2 hours ago\", \"15/03/2025\". Defaults to now"
    )]
    at: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Records one event, possibly backdated through `--at`.
pub async fn process_log_command(
    data: &impl DataAccess,
    clock: &impl Clock,
    LogCommand {
        trigger,
        at,
        date_style,
    }: LogCommand,
) -> Result<()> {
    let now = clock.now();
    let at = match at {
        None => now,
        Some(raw) => match parse_date_string(&raw, now, date_style.into()) {
            Ok(v) => v.with_timezone(&Local),
            Err(e) => return Err(anyhow!("Failed to parse --at value {raw:?}: {e}")),
        },
    };

    let entry = logbook::add_log(data, &trigger, at).await?;

    let count = today_count(&data.logs().await, now.date_naive());
    println!(
        "Logged {} at {}. {} today.",
        entry.trigger,
        entry.timestamp.format("%H:%M"),
        count
    );
    Ok(())
}

/// The quick landing view: today's tally, time since the last event and
/// month-to-date progress against the goal.
pub async fn process_status_command(data: &impl DataAccess, clock: &impl Clock) -> Result<()> {
    let now = clock.now();
    let today = now.date_naive();
    let logs = data.logs().await;

    let goal = analysis::effective_goal(data.monthly_goal().await);
    let month_count = analysis::month_to_date_count(&logs, today);
    let progress = analysis::goal_progress(month_count, goal);

    println!("Today        {}", today_count(&logs, today));
    match analysis::time_since_last(&logs, now) {
        Some(elapsed) => println!("Since last   {}", format_duration(elapsed)),
        None => println!("Since last   -"),
    }
    println!("This month   {month_count} / {goal}  ({progress}%)");
    println!("             {}", progress_bar(progress));

    let stats = cleanup_stats(data, today).await;
    if let Some(oldest) = stats.oldest_log_date {
        println!("History      {} entries since {oldest}", stats.total_logs);
    }
    if stats.logs_to_remove > 0 {
        println!(
            "             {} entries older than {RETENTION_MONTHS} months await the next sweep",
            stats.logs_to_remove
        );
    }
    Ok(())
}

fn today_count(logs: &[LogEntry], today: NaiveDate) -> usize {
    logs.iter().filter(|l| l.date == today).count()
}

const PROGRESS_BAR_WIDTH: u32 = 20;

fn progress_bar(progress: u32) -> String {
    let filled = (progress.min(100) * PROGRESS_BAR_WIDTH / 100) as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH as usize - filled)
    )
}

fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!("{}h{}m", v.num_hours(), v.num_minutes() % 60)
    } else if v.num_minutes() > 0 {
        format!("{}m", v.num_minutes())
    } else {
        format!("{}s", v.num_seconds().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_extremes() {
        assert_eq!(progress_bar(0), format!("[{}]", "-".repeat(20)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
        assert_eq!(progress_bar(50), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::seconds(42)), "42s");
        assert_eq!(format_duration(Duration::minutes(5)), "5m");
        assert_eq!(format_duration(Duration::minutes(125)), "2h5m");
    }
}
