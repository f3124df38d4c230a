//! Entity configuration — derived, read-only options and feature flags.
//!
//! Computed once by the resolver after capability discovery; recomputed only
//! on a full re-setup. Entities consume these values verbatim and never
//! inspect the capability set themselves.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Optional capabilities a climate entity advertises.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct ClimateFeatures: u8 {
        /// Target temperature can be set.
        const TARGET_TEMPERATURE = 1;
        /// Fan speed can be selected.
        const FAN_MODE = 1 << 1;
        /// Swing position can be selected.
        const SWING_MODE = 1 << 2;
        /// Presets can be selected.
        const PRESET_MODE = 1 << 3;
    }
}

/// Named preset an appliance may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Eco,
    Boost,
    Sleep,
}

impl Preset {
    /// Canonical lower-cased option name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Eco => "eco",
            Self::Boost => "boost",
            Self::Sleep => "sleep",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved configuration for the climate entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateConfig {
    /// Active optional capabilities.
    pub features: ClimateFeatures,
    /// Exposed hvac mode names; `"off"` is always present and first.
    pub hvac_modes: Vec<String>,
    /// Exposed fan speed names, device order. Empty when the feature is off.
    pub fan_modes: Vec<String>,
    /// Exposed swing position names, device order. Empty when the feature is off.
    pub swing_modes: Vec<String>,
    /// Exposed preset names. Empty when the feature is off.
    pub preset_modes: Vec<String>,
    /// Target temperature granularity, °C.
    pub temperature_step: f32,
    /// Lowest settable target temperature, °C.
    pub min_target_temperature: f32,
    /// Highest settable target temperature, °C.
    pub max_target_temperature: f32,
}

/// Device property a derived switch entity toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchProperty {
    /// Two-state purifier stage.
    Purifier,
    /// Front-panel display.
    Display,
}

/// Resolved configuration for a derived switch entity.
///
/// Only materialised for properties that are true binary toggles; a property
/// with three or more states is exposed as a multi-value option instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// Backing device property.
    pub property: SwitchProperty,
    /// Entity-facing name.
    pub name: String,
    /// Wire code the "on" position maps to.
    pub on_code: u8,
    /// Wire code the "off" position maps to.
    pub off_code: u8,
}

impl SwitchConfig {
    /// Map a raw property code to a switch position.
    ///
    /// Codes outside the two-state map read as "off" rather than guessing;
    /// an absent value reads as unknown (`None`).
    #[must_use]
    pub fn position(&self, code: Option<u8>) -> Option<bool> {
        let code = code?;
        Some(code == self.on_code)
    }
}
