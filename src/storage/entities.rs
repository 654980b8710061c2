use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDate;

use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// One recorded smoking event. Entries are created once by the logging action
/// and never modified afterwards; they disappear only through a full history
/// clear or the retention sweep.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub id: String,
    /// Source of truth for ordering and "time since last".
    pub timestamp: DateTime<Local>,
    pub trigger: String,
    /// Calendar day of `timestamp` in local time, captured at creation.
    /// Deliberately not re-derived on read so a timezone change does not move
    /// historical entries into different day buckets.
    pub date: NaiveDate,
}

impl LogEntry {
    pub fn new(trigger: impl Into<String>, at: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: at,
            trigger: trigger.into(),
            date: at.date_naive(),
        }
    }
}

/// A named category attachable to a [LogEntry]. Log entries keep the trigger
/// name by value, so deleting a custom trigger leaves old entries untouched.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub id: String,
    pub name: String,
    /// Symbolic key, resolved to a glyph by whatever renders it.
    pub icon: String,
    pub is_custom: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            "system" => Some(ThemeMode::System),
            _ => None,
        }
    }

    /// Effective dark state once the OS-level preference is known.
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => system_prefers_dark,
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub daily_check_in: bool,
    pub limit_alerts: bool,
    /// "HH:MM"
    pub check_in_time: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            daily_check_in: false,
            limit_alerts: false,
            check_in_time: "20:00".into(),
        }
    }
}

/// The full exportable bundle. Only used by backup export/import, never held
/// as runtime state.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StorageData {
    pub logs: Vec<LogEntry>,
    pub custom_triggers: Vec<Trigger>,
    pub monthly_goal: u32,
    pub notifications: NotificationSettings,
}
