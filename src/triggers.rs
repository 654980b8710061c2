use std::sync::LazyLock;

use thiserror::Error;
use uuid::Uuid;

use crate::storage::data_access::DataAccess;
use crate::storage::entities::Trigger;
use crate::storage::kv::StorageError;
use crate::storage::validation::{sanitize_input, MAX_TRIGGER_NAME_LEN};

pub const MAX_CUSTOM_TRIGGERS: usize = 20;

/// The fixed built-in categories. Always present, never editable.
pub static BUILTIN_TRIGGERS: LazyLock<Vec<Trigger>> = LazyLock::new(|| {
    [
        ("stress", "Stress"),
        ("social", "Social"),
        ("coffee", "Coffee"),
        ("after-meal", "After Meals"),
        ("driving", "Driving"),
        ("boredom", "Boredom"),
    ]
    .into_iter()
    .map(|(slug, name)| Trigger {
        id: slug.into(),
        name: name.into(),
        icon: slug.into(),
        is_custom: false,
    })
    .collect()
});

/// Business-rule rejections, returned as values so callers can show the
/// message directly.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("trigger name cannot be empty")]
    EmptyName,
    #[error("trigger name must be {MAX_TRIGGER_NAME_LEN} characters or less")]
    NameTooLong,
    #[error("a trigger with this name already exists")]
    DuplicateName,
    #[error("maximum of {MAX_CUSTOM_TRIGGERS} custom triggers reached")]
    LimitReached,
    #[error("no custom trigger with id {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Built-ins in their fixed order, then custom triggers in creation order.
pub async fn list_all(data: &impl DataAccess) -> Vec<Trigger> {
    let mut all = BUILTIN_TRIGGERS.clone();
    all.extend(data.custom_triggers().await);
    all
}

/// Creates and persists a new custom trigger.
pub async fn add_custom(
    data: &impl DataAccess,
    name: &str,
    icon: &str,
) -> Result<Trigger, TriggerError> {
    let customs = data.custom_triggers().await;
    if customs.len() >= MAX_CUSTOM_TRIGGERS {
        return Err(TriggerError::LimitReached);
    }

    let name = validate_name(name, &list_all(data).await)?;
    let trigger = Trigger {
        id: format!("custom-{}", Uuid::new_v4()),
        name,
        icon: icon.to_string(),
        is_custom: true,
    };

    let mut updated = customs;
    updated.push(trigger.clone());
    data.save_custom_triggers(&updated).await?;

    Ok(trigger)
}

/// Partial update of an existing custom trigger.
pub async fn update_custom(
    data: &impl DataAccess,
    id: &str,
    name: Option<&str>,
    icon: Option<&str>,
) -> Result<Trigger, TriggerError> {
    let mut customs = data.custom_triggers().await;
    let position = customs
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TriggerError::NotFound(id.to_string()))?;

    if let Some(name) = name {
        // uniqueness is checked against every trigger except the one renamed
        let others: Vec<Trigger> = list_all(data)
            .await
            .into_iter()
            .filter(|t| t.id != id)
            .collect();
        customs[position].name = validate_name(name, &others)?;
    }
    if let Some(icon) = icon {
        customs[position].icon = icon.to_string();
    }

    data.save_custom_triggers(&customs).await?;
    Ok(customs.swap_remove(position))
}

/// Removes a custom trigger. Log entries referencing its name keep the label
/// as plain text.
pub async fn delete_custom(data: &impl DataAccess, id: &str) -> Result<(), TriggerError> {
    let mut customs = data.custom_triggers().await;
    let before = customs.len();
    customs.retain(|t| t.id != id);
    if customs.len() == before {
        return Err(TriggerError::NotFound(id.to_string()));
    }

    data.save_custom_triggers(&customs).await?;
    Ok(())
}

/// Times each known trigger appears in the log, most used first. Triggers
/// that were never used still show up with a zero.
pub async fn usage_stats(data: &impl DataAccess) -> Vec<(String, usize)> {
    let logs = data.logs().await;
    let mut stats: Vec<(String, usize)> = list_all(data)
        .await
        .into_iter()
        .map(|t| {
            let count = logs.iter().filter(|l| l.trigger == t.name).count();
            (t.name, count)
        })
        .collect();
    stats.sort_by(|a, b| b.1.cmp(&a.1));
    stats
}

fn validate_name(name: &str, existing: &[Trigger]) -> Result<String, TriggerError> {
    let sanitized = sanitize_input(name);

    if sanitized.is_empty() {
        return Err(TriggerError::EmptyName);
    }
    if sanitized.chars().count() > MAX_TRIGGER_NAME_LEN {
        return Err(TriggerError::NameTooLong);
    }
    let lowered = sanitized.to_lowercase();
    if existing.iter().any(|t| t.name.to_lowercase() == lowered) {
        return Err(TriggerError::DuplicateName);
    }

    Ok(sanitized)
}
