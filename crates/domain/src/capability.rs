//! Capability Set — the per-unit enumeration of supported property values.
//!
//! Which modes, fan speeds, and swing positions a physical unit accepts is
//! not fixed per model family; it is discovered once at setup by querying
//! the appliance. The set is immutable afterwards (a full re-setup replaces
//! it wholesale). Value order is preserved as reported by the device, since
//! the protocol conveys a meaningful preference order.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! coded_enum {
    ($(#[doc = $doc:expr])* $name:ident { $($variant:ident = $code:expr => $label:expr),+ $(,)? }) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Wire code understood by the appliance.
            #[must_use]
            pub fn code(self) -> u8 {
                match self { $(Self::$variant => $code),+ }
            }

            /// Decode a wire code. Unknown codes yield `None`, never a guess.
            #[must_use]
            pub fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Canonical lower-cased option name exposed to entities.
            #[must_use]
            pub fn label(self) -> &'static str {
                match self { $(Self::$variant => $label),+ }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

coded_enum!(
    /// Operating mode of the appliance.
    OperationalMode {
        Auto = 1 => "auto",
        Cool = 2 => "cool",
        Dry = 3 => "dry",
        Heat = 4 => "heat",
        FanOnly = 5 => "fan_only",
    }
);

coded_enum!(
    /// Fan speed. Discrete codes on the wire; `Auto` lets the unit decide.
    FanSpeed {
        Silent = 20 => "silent",
        Low = 40 => "low",
        Medium = 60 => "medium",
        High = 80 => "high",
        Full = 100 => "full",
        Auto = 102 => "auto",
    }
);

coded_enum!(
    /// Louver swing position. `Off` is a sentinel, not a real option.
    SwingMode {
        Off = 0x0 => "off",
        Horizontal = 0x3 => "horizontal",
        Vertical = 0xC => "vertical",
        Both = 0xF => "both",
    }
);

/// A discrete value whose name set is open-ended per model (e.g. purifier
/// modes), carried as a code plus the device-reported symbolic name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCode {
    /// Wire code understood by the appliance.
    pub code: u8,
    /// Symbolic name as reported by the device.
    pub name: String,
}

impl ValueCode {
    /// Create a value code.
    #[must_use]
    pub fn new(code: u8, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }

    /// Canonical lower-cased option name.
    #[must_use]
    pub fn label(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Everything a specific physical unit supports, discovered once at setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// Supported operating modes, device order. Never empty on a valid unit.
    pub operational_modes: Vec<OperationalMode>,
    /// Supported fan speeds, device order. May be empty.
    pub fan_speeds: Vec<FanSpeed>,
    /// Supported swing positions, device order. May be empty or `[Off]`.
    pub swing_modes: Vec<SwingMode>,
    /// Supported purifier modes, device order. May be empty.
    pub purifier_modes: Vec<ValueCode>,
    /// Unit supports the eco preset.
    pub supports_eco: bool,
    /// Unit supports the turbo/boost preset.
    pub supports_turbo: bool,
    /// Unit supports the sleep preset.
    pub supports_sleep: bool,
    /// Unit supports toggling its front-panel display.
    pub supports_display_control: bool,
    /// Lowest accepted target temperature, °C.
    pub min_target_temperature: f32,
    /// Highest accepted target temperature, °C.
    pub max_target_temperature: f32,
    /// Target temperature granularity, °C.
    pub target_temperature_step: f32,
}

impl Default for CapabilitySet {
    /// A typical mid-range unit; used when a device cannot report
    /// capabilities and as a baseline in tests.
    fn default() -> Self {
        Self {
            operational_modes: vec![
                OperationalMode::Auto,
                OperationalMode::Cool,
                OperationalMode::Dry,
                OperationalMode::Heat,
                OperationalMode::FanOnly,
            ],
            fan_speeds: vec![
                FanSpeed::Silent,
                FanSpeed::Low,
                FanSpeed::Medium,
                FanSpeed::High,
                FanSpeed::Auto,
            ],
            swing_modes: vec![SwingMode::Off, SwingMode::Vertical],
            purifier_modes: Vec::new(),
            supports_eco: true,
            supports_turbo: true,
            supports_sleep: true,
            supports_display_control: true,
            min_target_temperature: 17.0,
            max_target_temperature: 30.0,
            target_temperature_step: 1.0,
        }
    }
}

impl CapabilitySet {
    /// Check discovery invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyOperationalModes`] when the mandatory
    /// operational-mode list is empty. Optional properties may be empty and
    /// still resolve to a well-defined (empty) configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.operational_modes.is_empty() {
            return Err(ValidationError::EmptyOperationalModes);
        }
        Ok(())
    }

    /// Whether `code` is a discovered operational mode.
    #[must_use]
    pub fn supports_mode_code(&self, code: u8) -> bool {
        self.operational_modes.iter().any(|m| m.code() == code)
    }

    /// Whether `code` is a discovered fan speed.
    #[must_use]
    pub fn supports_fan_code(&self, code: u8) -> bool {
        self.fan_speeds.iter().any(|s| s.code() == code)
    }

    /// Whether `code` is a discovered swing position.
    #[must_use]
    pub fn supports_swing_code(&self, code: u8) -> bool {
        self.swing_modes.iter().any(|m| m.code() == code)
    }

    /// Whether `code` is a discovered purifier mode.
    #[must_use]
    pub fn supports_purifier_code(&self, code: u8) -> bool {
        self.purifier_modes.iter().any(|m| m.code == code)
    }

    /// Whether `value` falls within the accepted target-temperature range.
    #[must_use]
    pub fn temperature_in_range(&self, value: f32) -> bool {
        value >= self.min_target_temperature && value <= self.max_target_temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_round_trip_known_codes() {
        assert_eq!(OperationalMode::from_code(2), Some(OperationalMode::Cool));
        assert_eq!(FanSpeed::from_code(102), Some(FanSpeed::Auto));
        assert_eq!(SwingMode::from_code(0xF), Some(SwingMode::Both));
        assert_eq!(OperationalMode::Cool.code(), 2);
    }

    #[test]
    fn should_return_none_for_unknown_codes() {
        assert_eq!(OperationalMode::from_code(0), None);
        assert_eq!(FanSpeed::from_code(77), None);
        assert_eq!(SwingMode::from_code(0x5), None);
    }

    #[test]
    fn should_expose_lowercase_labels() {
        assert_eq!(OperationalMode::FanOnly.label(), "fan_only");
        assert_eq!(FanSpeed::Auto.label(), "auto");
        assert_eq!(SwingMode::Both.to_string(), "both");
    }

    #[test]
    fn should_lowercase_value_code_labels() {
        let mode = ValueCode::new(1, "Mode1");
        assert_eq!(mode.label(), "mode1");
    }

    #[test]
    fn should_reject_empty_operational_modes() {
        let caps = CapabilitySet {
            operational_modes: Vec::new(),
            ..CapabilitySet::default()
        };
        assert_eq!(
            caps.validate(),
            Err(ValidationError::EmptyOperationalModes)
        );
    }

    #[test]
    fn should_accept_empty_optional_properties() {
        let caps = CapabilitySet {
            fan_speeds: Vec::new(),
            swing_modes: Vec::new(),
            purifier_modes: Vec::new(),
            ..CapabilitySet::default()
        };
        assert!(caps.validate().is_ok());
    }

    #[test]
    fn should_answer_membership_queries_by_code() {
        let caps = CapabilitySet::default();
        assert!(caps.supports_mode_code(OperationalMode::Heat.code()));
        assert!(caps.supports_fan_code(FanSpeed::Low.code()));
        assert!(!caps.supports_fan_code(FanSpeed::Full.code()));
        assert!(caps.supports_swing_code(SwingMode::Vertical.code()));
        assert!(!caps.supports_swing_code(SwingMode::Both.code()));
        assert!(!caps.supports_purifier_code(1));
    }

    #[test]
    fn should_check_temperature_range_inclusively() {
        let caps = CapabilitySet::default();
        assert!(caps.temperature_in_range(17.0));
        assert!(caps.temperature_in_range(30.0));
        assert!(!caps.temperature_in_range(16.5));
        assert!(!caps.temperature_in_range(30.5));
    }

    #[test]
    fn should_serialize_modes_as_snake_case() {
        let json = serde_json::to_string(&OperationalMode::FanOnly).unwrap();
        assert_eq!(json, "\"fan_only\"");
    }
}
