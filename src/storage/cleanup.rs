use chrono::{DateTime, Duration, Local, Months, NaiveDate};
use tracing::{info, warn};

use super::data_access::DataAccess;

/// Entries whose calendar date falls before today minus this many months are
/// purged by the sweep.
pub const RETENTION_MONTHS: u32 = 6;

const SWEEP_INTERVAL_HOURS: i64 = 24;

/// Dry-run figures for the retention sweep.
#[derive(Debug, PartialEq, Eq)]
pub struct CleanupStats {
    pub total_logs: usize,
    pub logs_to_remove: usize,
    pub oldest_log_date: Option<NaiveDate>,
    pub cutoff_date: NaiveDate,
}

/// First calendar date that is still retained. The horizon is computed by
/// decrementing the month, not by elapsed milliseconds, so it stays stable
/// across unequal month lengths.
pub fn retention_cutoff(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(RETENTION_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}

fn sweep_due(last_check: Option<DateTime<Local>>, now: DateTime<Local>) -> bool {
    match last_check {
        // An unreadable marker counts as "due": better to sweep again than to
        // let stale data accumulate.
        None => true,
        Some(last) => now - last >= Duration::hours(SWEEP_INTERVAL_HOURS),
    }
}

/// Runs the retention sweep if more than 24 hours have passed since the last
/// recorded one. Returns the number of entries removed; 0 when the sweep was
/// not due or nothing qualified. Never fails the caller: storage problems
/// are logged and the sweep retries on a later run.
pub async fn auto_cleanup(data: &impl DataAccess, now: DateTime<Local>) -> usize {
    if !sweep_due(data.last_cleanup_check().await, now) {
        return 0;
    }

    let removed = cleanup_old_logs(data, now.date_naive()).await;

    if let Err(e) = data.save_last_cleanup_check(now).await {
        warn!("Failed to record cleanup marker: {e}");
    }

    removed
}

/// Unconditionally filters out entries past the retention horizon and
/// persists the remainder.
pub async fn cleanup_old_logs(data: &impl DataAccess, today: NaiveDate) -> usize {
    let logs = data.logs().await;
    let cutoff = retention_cutoff(today);

    let retained: Vec<_> = logs.iter().filter(|l| l.date >= cutoff).cloned().collect();
    let removed = logs.len() - retained.len();
    if removed == 0 {
        return 0;
    }

    match data.save_logs(&retained).await {
        Ok(()) => {
            info!("Removed {removed} entries older than {cutoff}");
            removed
        }
        Err(e) => {
            warn!("Failed to persist swept log collection: {e}");
            0
        }
    }
}

/// What a sweep running today would do, without doing it.
pub async fn cleanup_stats(data: &impl DataAccess, today: NaiveDate) -> CleanupStats {
    let logs = data.logs().await;
    let cutoff = retention_cutoff(today);

    CleanupStats {
        total_logs: logs.len(),
        logs_to_remove: logs.iter().filter(|l| l.date < cutoff).count(),
        oldest_log_date: logs.iter().map(|l| l.date).min(),
        cutoff_date: cutoff,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::storage::data_access::{keys, LocalDataAccess};
    use crate::storage::entities::LogEntry;
    use crate::storage::kv::memory::MemoryKeyValueStore;

    use super::*;

    const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap()
    }

    fn entry_on(date: NaiveDate) -> LogEntry {
        let at = Local
            .from_local_datetime(&date.and_hms_opt(10, 0, 0).unwrap())
            .unwrap();
        LogEntry::new("Stress", at)
    }

    #[test]
    fn test_cutoff_decrements_calendar_months() {
        assert_eq!(
            retention_cutoff(TODAY),
            NaiveDate::from_ymd_opt(2023, 10, 5).unwrap()
        );
        // clamped into the shorter month
        assert_eq!(
            retention_cutoff(NaiveDate::from_ymd_opt(2024, 8, 31).unwrap()),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[tokio::test]
    async fn test_sweep_boundary_dates() {
        let cutoff = retention_cutoff(TODAY);
        let too_old = entry_on(cutoff.pred_opt().unwrap());
        let just_inside = entry_on(cutoff);
        let recent = entry_on(TODAY);

        let data = LocalDataAccess::new(MemoryKeyValueStore::default());
        data.save_logs(&[too_old.clone(), just_inside.clone(), recent.clone()])
            .await
            .unwrap();

        let removed = auto_cleanup(&data, now()).await;

        assert_eq!(removed, 1);
        assert_eq!(data.logs().await, vec![just_inside, recent]);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent_within_a_day() {
        let data = LocalDataAccess::new(MemoryKeyValueStore::default());
        let old = entry_on(retention_cutoff(TODAY).pred_opt().unwrap());
        data.save_logs(&[old, entry_on(TODAY)]).await.unwrap();

        assert_eq!(auto_cleanup(&data, now()).await, 1);
        // second call within the window does not re-run the filter
        assert_eq!(auto_cleanup(&data, now() + Duration::hours(1)).await, 0);
        // but a day later it is due again
        assert_eq!(auto_cleanup(&data, now() + Duration::hours(24)).await, 0);
        assert_eq!(data.logs().await.len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_due_when_marker_missing_or_unreadable() {
        assert!(sweep_due(None, now()));
        assert!(!sweep_due(Some(now() - Duration::hours(23)), now()));
        assert!(sweep_due(Some(now() - Duration::hours(24)), now()));

        // a malformed marker reads back as None, which fails open
        let store = MemoryKeyValueStore::with(&[(keys::LAST_CLEANUP_CHECK, "garbage")]);
        let data = LocalDataAccess::new(store);
        assert_eq!(data.last_cleanup_check().await, None);
    }

    #[tokio::test]
    async fn test_no_sweep_leaves_collection_untouched() {
        let data = LocalDataAccess::new(MemoryKeyValueStore::default());
        let logs = vec![entry_on(TODAY)];
        data.save_logs(&logs).await.unwrap();

        assert_eq!(auto_cleanup(&data, now()).await, 0);
        assert_eq!(data.logs().await, logs);
    }

    #[tokio::test]
    async fn test_cleanup_stats_reports_without_mutating() {
        let data = LocalDataAccess::new(MemoryKeyValueStore::default());
        let cutoff = retention_cutoff(TODAY);
        let old = entry_on(cutoff.pred_opt().unwrap());
        let recent = entry_on(TODAY);
        data.save_logs(&[old.clone(), recent]).await.unwrap();

        let stats = cleanup_stats(&data, TODAY).await;

        assert_eq!(
            stats,
            CleanupStats {
                total_logs: 2,
                logs_to_remove: 1,
                oldest_log_date: Some(old.date),
                cutoff_date: cutoff,
            }
        );
        assert_eq!(data.logs().await.len(), 2);
    }
}
