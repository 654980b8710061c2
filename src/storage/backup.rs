use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::data_access::DataAccess;
use super::entities::{LogEntry, NotificationSettings, StorageData, Trigger};
use super::kv::StorageError;
use super::validation;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not parse backup file: {0}")]
    Parse(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Number of records a partial import actually applied.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub accepted: usize,
}

/// Serializes the full bundle, pretty-printed for hand inspection.
pub async fn export_json(data: &impl DataAccess) -> Result<String, StorageError> {
    let bundle = StorageData {
        logs: data.logs().await,
        custom_triggers: data.custom_triggers().await,
        monthly_goal: data.monthly_goal().await,
        notifications: data.notifications().await,
    };

    serde_json::to_string_pretty(&bundle).map_err(|e| StorageError::Serialize {
        key: "export".to_string(),
        source: e,
    })
}

/// Imports a backup produced by [export_json]. Any subset of the bundle's
/// fields may be present; collection elements are validated one by one and
/// invalid ones are skipped rather than failing the import.
pub async fn import_json(
    data: &impl DataAccess,
    content: &str,
) -> Result<ImportSummary, ImportError> {
    let bundle: Value =
        serde_json::from_str(content).map_err(|e| ImportError::Parse(e.to_string()))?;

    let mut summary = ImportSummary::default();

    if let Some(raw_logs) = bundle.get("logs").and_then(Value::as_array) {
        let logs = accept_valid::<LogEntry>(raw_logs, validation::is_valid_log_entry, "log");
        if !logs.is_empty() {
            data.save_logs(&logs).await?;
            summary.accepted += logs.len();
        }
    }

    if let Some(raw_triggers) = bundle.get("customTriggers").and_then(Value::as_array) {
        let triggers = accept_valid::<Trigger>(raw_triggers, validation::is_valid_trigger, "trigger");
        if !triggers.is_empty() {
            data.save_custom_triggers(&triggers).await?;
            summary.accepted += triggers.len();
        }
    }

    if let Some(goal) = bundle.get("monthlyGoal").and_then(Value::as_u64) {
        let goal = u32::try_from(goal).unwrap_or(u32::MAX);
        if validation::validate_monthly_goal(goal).is_ok() {
            data.save_monthly_goal(goal).await?;
            summary.accepted += 1;
        } else {
            warn!("Skipping out-of-range monthly goal {goal}");
        }
    }

    if let Some(raw) = bundle.get("notifications") {
        match serde_json::from_value::<NotificationSettings>(raw.clone()) {
            Ok(settings) => {
                data.save_notifications(&settings).await?;
                summary.accepted += 1;
            }
            Err(e) => warn!("Skipping malformed notification settings: {e}"),
        }
    }

    Ok(summary)
}

fn accept_valid<T: serde::de::DeserializeOwned>(
    values: &[Value],
    is_valid: fn(&Value) -> bool,
    kind: &str,
) -> Vec<T> {
    let accepted: Vec<T> = values
        .iter()
        .filter(|v| is_valid(v))
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect();
    if accepted.len() < values.len() {
        warn!("Skipped {} invalid {kind} records", values.len() - accepted.len());
    }
    accepted
}

/// Logs-only CSV rendering: `Date,Time,Trigger` header, one row per entry,
/// times in local time.
pub fn export_csv(logs: &[LogEntry]) -> String {
    let mut out = String::from("Date,Time,Trigger\n");
    for log in logs {
        out.push_str(&format!(
            "{},{},{}\n",
            log.date.format("%Y-%m-%d"),
            log.timestamp.format("%H:%M:%S"),
            log.trigger
        ));
    }
    out
}

pub fn csv_export_filename(today: NaiveDate) -> String {
    format!("pufflog-{}.csv", today.format("%Y-%m-%d"))
}

pub fn json_export_filename(today: NaiveDate) -> String {
    format!("pufflog-backup-{}.json", today.format("%Y-%m-%d"))
}
