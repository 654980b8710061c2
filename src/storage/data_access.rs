use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::entities::{LogEntry, NotificationSettings, ThemeMode, Trigger};
use super::kv::{KeyValueStore, StorageError};
use super::validation;

/// Key strings are part of the on-disk contract. Renaming one silently
/// orphans existing user data, so they must stay stable across versions.
pub mod keys {
    pub const LOGS: &str = "smoking_logs";
    pub const CUSTOM_TRIGGERS: &str = "custom_triggers";
    pub const MONTHLY_GOAL: &str = "monthly_goal";
    pub const THEME_MODE: &str = "theme_mode";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const LAST_CLEANUP_CHECK: &str = "last_cleanup_check";

    pub const ALL: [&str; 6] = [
        LOGS,
        CUSTOM_TRIGGERS,
        MONTHLY_GOAL,
        THEME_MODE,
        NOTIFICATIONS,
        LAST_CLEANUP_CHECK,
    ];
}

/// Typed access to every persisted resource. Reads always resolve to a
/// usable default, whatever state the underlying store is in; writes surface
/// [StorageError] and leave the retry/ignore/report decision to the caller.
///
/// There is one concrete implementation today; a future remote backend means
/// adding a second implementation, not branching inside this one.
#[async_trait]
pub trait DataAccess: Send + Sync {
    async fn logs(&self) -> Vec<LogEntry>;

    async fn save_logs(&self, logs: &[LogEntry]) -> Result<(), StorageError>;

    async fn custom_triggers(&self) -> Vec<Trigger>;

    async fn save_custom_triggers(&self, triggers: &[Trigger]) -> Result<(), StorageError>;

    /// 0 means "never set"; callers substitute the default goal.
    async fn monthly_goal(&self) -> u32;

    async fn save_monthly_goal(&self, goal: u32) -> Result<(), StorageError>;

    async fn theme_mode(&self) -> ThemeMode;

    async fn save_theme_mode(&self, mode: ThemeMode) -> Result<(), StorageError>;

    async fn notifications(&self) -> NotificationSettings;

    async fn save_notifications(&self, value: &NotificationSettings) -> Result<(), StorageError>;

    async fn last_cleanup_check(&self) -> Option<DateTime<Local>>;

    async fn save_last_cleanup_check(&self, at: DateTime<Local>) -> Result<(), StorageError>;

    /// Removes every key this module owns and nothing else.
    async fn clear_all(&self) -> Result<(), StorageError>;
}

/// [DataAccess] over a local [KeyValueStore].
pub struct LocalDataAccess<S> {
    store: S,
}

impl<S: KeyValueStore> LocalDataAccess<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reads a JSON collection, dropping elements that fail shape validation
    /// instead of rejecting the whole array. A malformed blob degrades to an
    /// empty collection.
    async fn read_collection<T: DeserializeOwned>(
        &self,
        key: &str,
        is_valid: fn(&Value) -> bool,
    ) -> Vec<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return vec![],
            Err(e) => {
                warn!("Failed to read {key}: {e}");
                return vec![];
            }
        };

        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!("Stored value under {key} is not a JSON array: {e}");
                return vec![];
            }
        };

        let total = values.len();
        let parsed: Vec<T> = values
            .into_iter()
            .filter(is_valid)
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();
        if parsed.len() < total {
            warn!("Dropped {} malformed records under {key}", total - parsed.len());
        }
        parsed
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let text = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
            key: key.to_string(),
            source: e,
        })?;
        self.store.set(key, &text).await
    }
}

#[async_trait]
impl<S: KeyValueStore> DataAccess for LocalDataAccess<S> {
    async fn logs(&self) -> Vec<LogEntry> {
        self.read_collection(keys::LOGS, validation::is_valid_log_entry)
            .await
    }

    async fn save_logs(&self, logs: &[LogEntry]) -> Result<(), StorageError> {
        self.write_json(keys::LOGS, &logs).await
    }

    async fn custom_triggers(&self) -> Vec<Trigger> {
        self.read_collection(keys::CUSTOM_TRIGGERS, validation::is_valid_trigger)
            .await
    }

    async fn save_custom_triggers(&self, triggers: &[Trigger]) -> Result<(), StorageError> {
        self.write_json(keys::CUSTOM_TRIGGERS, &triggers).await
    }

    async fn monthly_goal(&self) -> u32 {
        match self.store.get(keys::MONTHLY_GOAL).await {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Stored monthly goal {raw:?} is not an integer");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!("Failed to read monthly goal: {e}");
                0
            }
        }
    }

    async fn save_monthly_goal(&self, goal: u32) -> Result<(), StorageError> {
        self.store.set(keys::MONTHLY_GOAL, &goal.to_string()).await
    }

    async fn theme_mode(&self) -> ThemeMode {
        match self.store.get(keys::THEME_MODE).await {
            Ok(Some(raw)) => ThemeMode::from_stored(raw.trim()).unwrap_or_else(|| {
                warn!("Stored theme mode {raw:?} is unknown");
                ThemeMode::System
            }),
            Ok(None) => ThemeMode::System,
            Err(e) => {
                warn!("Failed to read theme mode: {e}");
                ThemeMode::System
            }
        }
    }

    async fn save_theme_mode(&self, mode: ThemeMode) -> Result<(), StorageError> {
        self.store.set(keys::THEME_MODE, mode.as_str()).await
    }

    async fn notifications(&self) -> NotificationSettings {
        match self.store.get(keys::NOTIFICATIONS).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Stored notification settings are malformed: {e}");
                NotificationSettings::default()
            }),
            Ok(None) => NotificationSettings::default(),
            Err(e) => {
                warn!("Failed to read notification settings: {e}");
                NotificationSettings::default()
            }
        }
    }

    async fn save_notifications(&self, value: &NotificationSettings) -> Result<(), StorageError> {
        self.write_json(keys::NOTIFICATIONS, value).await
    }

    async fn last_cleanup_check(&self) -> Option<DateTime<Local>> {
        match self.store.get(keys::LAST_CLEANUP_CHECK).await {
            Ok(Some(raw)) => match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(at) => Some(at.with_timezone(&Local)),
                Err(e) => {
                    warn!("Stored cleanup marker {raw:?} is malformed: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read cleanup marker: {e}");
                None
            }
        }
    }

    async fn save_last_cleanup_check(&self, at: DateTime<Local>) -> Result<(), StorageError> {
        self.store
            .set(keys::LAST_CLEANUP_CHECK, &at.to_rfc3339())
            .await
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        for key in keys::ALL {
            self.store.remove(key).await?;
        }
        Ok(())
    }
}
