use chrono::{DateTime, Local};
use thiserror::Error;

use crate::storage::data_access::DataAccess;
use crate::storage::entities::LogEntry;
use crate::storage::kv::StorageError;
use crate::storage::validation::sanitize_input;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("trigger label cannot be empty")]
    EmptyTrigger,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Appends one event to the persisted log.
///
/// The write path is read-modify-write against the store: the current
/// collection is re-read immediately before appending, so two logical
/// appends that each await the previous write never lose an entry to a
/// stale in-memory copy.
pub async fn add_log(
    data: &impl DataAccess,
    trigger: &str,
    at: DateTime<Local>,
) -> Result<LogEntry, LogError> {
    let trigger = sanitize_input(trigger);
    if trigger.is_empty() {
        return Err(LogError::EmptyTrigger);
    }

    let mut logs = data.logs().await;
    let entry = LogEntry::new(trigger, at);
    logs.push(entry.clone());
    data.save_logs(&logs).await?;

    Ok(entry)
}
