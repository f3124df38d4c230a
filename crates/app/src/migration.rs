//! Versioned migration of persisted per-device options.
//!
//! A chain of small, pure steps keyed by the stored schema version, applied
//! in order up to [`CURRENT_VERSION`]. Each step only knows about the two
//! versions it bridges; the chain composes them, so a v1 document passes
//! through every step and a current document passes through none.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Schema version written by this release.
pub const CURRENT_VERSION: u32 = 4;

/// A persisted device registration as loaded from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Schema version the document was written with.
    pub version: u32,
    /// Device unique id; older installs stored raw integers.
    pub unique_id: Value,
    /// Per-device user options.
    #[serde(default)]
    pub options: Map<String, Value>,
}

/// Why a stored document could not be migrated.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// Written by a newer release; downgrade migrations are not supported.
    #[error("stored version {0} is newer than supported version {CURRENT_VERSION}")]
    FutureVersion(u32),

    /// The document does not match any known shape.
    #[error("stored entry is malformed: {0}")]
    Malformed(&'static str),
}

/// Bring `entry` up to [`CURRENT_VERSION`], step by step.
///
/// Idempotent on current documents.
///
/// # Errors
///
/// Returns [`MigrationError::FutureVersion`] for documents written by a
/// newer release and [`MigrationError::Malformed`] when a step cannot make
/// sense of the stored data.
pub fn migrate(entry: &mut StoredEntry) -> Result<(), MigrationError> {
    if entry.version > CURRENT_VERSION {
        return Err(MigrationError::FutureVersion(entry.version));
    }
    if entry.version == 0 {
        return Err(MigrationError::Malformed("schema versions start at 1"));
    }

    while entry.version < CURRENT_VERSION {
        match entry.version {
            1 => stringify_unique_id(entry)?,
            2 => fold_alternate_energy_flag(entry),
            3 => expand_energy_format_and_group_workarounds(entry)?,
            _ => unreachable!("version bounded by CURRENT_VERSION"),
        }
        entry.version += 1;
        tracing::debug!(version = entry.version, "migrated options schema");
    }
    Ok(())
}

/// 1 → 2: unique ids were stored as raw integers; normalise to strings.
fn stringify_unique_id(entry: &mut StoredEntry) -> Result<(), MigrationError> {
    entry.unique_id = match &entry.unique_id {
        Value::String(_) => return Ok(()),
        Value::Number(n) => Value::String(n.to_string()),
        _ => return Err(MigrationError::Malformed("unique_id is neither string nor number")),
    };
    Ok(())
}

/// 2 → 3: a single boolean selected between two energy wire formats; fold
/// it into the tagged `energy_format` that v3 introduced.
fn fold_alternate_energy_flag(entry: &mut StoredEntry) {
    let use_alternate = entry
        .options
        .remove("use_alternate_energy_format")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let format = if use_alternate { "alternate_b" } else { "default" };
    entry
        .options
        .insert("energy_format".to_string(), Value::String(format.to_string()));
}

/// 3 → 4: the single `energy_format` tag becomes a per-sensor
/// format+scale pair, and the loose workaround flags are grouped.
fn expand_energy_format_and_group_workarounds(
    entry: &mut StoredEntry,
) -> Result<(), MigrationError> {
    let format = entry
        .options
        .remove("energy_format")
        .unwrap_or_else(|| Value::String("default".to_string()));
    let format = format
        .as_str()
        .ok_or(MigrationError::Malformed("energy_format is not a string"))?
        .to_string();

    let (energy, power) = match format.as_str() {
        "default" => (("bcd", 1.0), ("bcd", 1.0)),
        "alternate_a" => (("binary", 1.0), ("binary", 1.0)),
        "alternate_b" => (("binary", 0.1), ("binary", 1.0)),
        _ => return Err(MigrationError::Malformed("unknown energy_format value")),
    };
    entry.options.insert(
        "energy_sensor".to_string(),
        json!({"format": energy.0, "scale": energy.1}),
    );
    entry.options.insert(
        "power_sensor".to_string(),
        json!({"format": power.0, "scale": power.1}),
    );

    let mut workarounds = Map::new();
    for (key, default) in [
        ("use_fan_only_workaround", Value::Bool(false)),
        ("show_all_presets", Value::Bool(false)),
        ("additional_operation_modes", Value::String("none".to_string())),
    ] {
        let value = entry.options.remove(key).unwrap_or(default);
        workarounds.insert(key.to_string(), value);
    }
    entry
        .options
        .insert("workarounds".to_string(), Value::Object(workarounds));

    Ok(())
}
