use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use thiserror::Error;

pub const MAX_TRIGGER_NAME_LEN: usize = 30;
pub const MAX_MONTHLY_GOAL: u32 = 10_000;

/// Upper bound applied during sanitization, before any business validation.
const SANITIZED_INPUT_CAP: usize = 100;

/// Checks whether an untrusted decoded value structurally matches a
/// [LogEntry](super::entities::LogEntry). Used on import and defensively when
/// reading persisted collections back.
pub fn is_valid_log_entry(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };

    let id_ok = object
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty());
    let timestamp_ok = object
        .get("timestamp")
        .and_then(Value::as_str)
        .is_some_and(|ts| DateTime::parse_from_rfc3339(ts).is_ok());
    let trigger_ok = object
        .get("trigger")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    let date_ok = object
        .get("date")
        .and_then(Value::as_str)
        .is_some_and(is_valid_date);

    id_ok && timestamp_ok && trigger_ok && date_ok
}

/// Checks whether an untrusted decoded value structurally matches a
/// [Trigger](super::entities::Trigger).
pub fn is_valid_trigger(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };

    let id_ok = object
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty());
    let name_ok = object
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty() && name.chars().count() <= MAX_TRIGGER_NAME_LEN);
    let icon_ok = object
        .get("icon")
        .and_then(Value::as_str)
        .is_some_and(|icon| !icon.is_empty());
    let custom_ok = object.get("isCustom").is_some_and(Value::is_boolean);

    id_ok && name_ok && icon_ok && custom_ok
}

/// `YYYY-MM-DD`, and an actual calendar date.
pub fn is_valid_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());

    digits_ok && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Trims whitespace, strips angle brackets and caps length. Applied to user
/// input before any validation or storage.
pub fn sanitize_input(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .take(SANITIZED_INPUT_CAP)
        .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GoalError {
    #[error("monthly goal cannot exceed {MAX_MONTHLY_GOAL}")]
    TooLarge,
}

/// Bounds check for explicit user input. Stored goals are not re-validated on
/// read.
pub fn validate_monthly_goal(goal: u32) -> Result<(), GoalError> {
    if goal > MAX_MONTHLY_GOAL {
        return Err(GoalError::TooLarge);
    }
    Ok(())
}
