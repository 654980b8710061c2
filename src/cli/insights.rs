use ansi_term::{Colour, Style};
use anyhow::Result;

use crate::stats::analysis::{self, DailyCount, TriggerCount};
use crate::stats::{filter_by_period, Period};
use crate::storage::data_access::DataAccess;
use crate::utils::clock::Clock;

const BAR_WIDTH: usize = 24;

/// Renders the aggregate view for a period: totals, trigger breakdown and
/// the daily trend with zero days included.
pub async fn process_insights_command(
    data: &impl DataAccess,
    clock: &impl Clock,
    period: Period,
) -> Result<()> {
    let now = clock.now();
    let today = now.date_naive();
    let logs = data.logs().await;

    let filtered = filter_by_period(&logs, period, today);
    let breakdown = analysis::trigger_breakdown(&filtered);
    let average = analysis::daily_average(&filtered, period, &logs);
    let trend = analysis::daily_trend(&logs, period, today);

    let goal = analysis::effective_goal(data.monthly_goal().await);
    let month_count = analysis::month_to_date_count(&logs, today);
    let progress = analysis::goal_progress(month_count, goal);

    println!("{}", Style::new().bold().paint(period_title(period)));
    println!();
    println!("Total          {}", filtered.len());
    println!("Daily average  {average:.1}");
    println!("Top trigger    {}", analysis::top_trigger(&breakdown));
    println!("Monthly goal   {month_count} / {goal}  ({progress}%)");

    print_breakdown(&breakdown);
    print_trend(&trend);
    Ok(())
}

fn period_title(period: Period) -> &'static str {
    match period {
        Period::Week => "Last 7 days",
        Period::Month => "Last 30 days",
        Period::All => "All time",
    }
}

fn print_breakdown(breakdown: &[TriggerCount]) {
    if breakdown.is_empty() {
        return;
    }

    println!();
    println!("{}", Style::new().bold().paint("Triggers"));
    let widest = breakdown.iter().map(|t| t.name.len()).max().unwrap_or(0);
    let max_count = breakdown.iter().map(|t| t.count).max().unwrap_or(1);
    for entry in breakdown {
        println!(
            "{:widest$}  {:>4}  {}",
            entry.name,
            entry.count,
            bar(entry.count, max_count)
        );
    }
}

fn print_trend(trend: &[DailyCount]) {
    println!();
    println!(
        "{}",
        Style::new()
            .bold()
            .paint(format!("Daily trend (last {} days)", trend.len()))
    );
    let max_count = trend.iter().map(|d| d.count).max().unwrap_or(0).max(1);
    for day in trend {
        println!("{}  {:>3}  {}", day.date, day.count, bar(day.count, max_count));
    }

    if let Some(change) = analysis::week_over_week(trend) {
        let annotation = if change < 0 {
            Colour::Green.paint(format!("down {}% vs previous week", change.abs()))
        } else {
            Colour::Red.paint(format!("up {change}% vs previous week"))
        };
        println!();
        println!("{annotation}");
    }
}

fn bar(count: usize, max_count: usize) -> String {
    "#".repeat(count * BAR_WIDTH / max_count.max(1))
}
