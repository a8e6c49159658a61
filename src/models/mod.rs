// src/models/mod.rs

pub mod choices;
pub mod contact;
pub mod equipment;
pub mod fleet;
pub mod project;
pub mod stock;
pub mod supplier;
pub mod vehicle_record;

pub use choices::*;
pub use contact::*;
pub use equipment::*;
pub use fleet::*;
pub use project::*;
pub use stock::*;
pub use supplier::*;
pub use vehicle_record::*;

use serde::{Deserialize, Deserializer};

// ==================== COMMON / SHARED ====================

/// Trimmed text, `None` when blank.
pub fn clean_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Optional form field where an empty string means "not given".
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(clean_text))
}

/// Partial update of a nullable column: absent leaves it, blank clears it.
pub fn patch_optional(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        *target = clean_text(v);
    }
}

/// Partial update of a required text column.
pub fn patch_required(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v.trim().to_string();
    }
}
