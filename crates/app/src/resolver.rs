//! Capability Configuration Resolver — capability set in, entity config out.
//!
//! Pure and idempotent: the same capability set always resolves to the same
//! configuration, with no hidden state. Runs once after capability discovery
//! and again only on a full re-setup.

use chillhub_domain::capability::{CapabilitySet, SwingMode};
use chillhub_domain::entity_config::{
    ClimateConfig, ClimateFeatures, Preset, SwitchConfig, SwitchProperty,
};

/// Everything the host materialises for one device.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntities {
    /// The climate entity every device gets.
    pub climate: ClimateConfig,
    /// Derived switch entities; may be empty.
    pub switches: Vec<SwitchConfig>,
}

/// Derive entity configuration from a discovered capability set.
///
/// Option lists keep the device's reported order; names are the canonical
/// lower-cased labels. An empty optional property yields an unset feature
/// flag and an empty option list, never an error.
#[must_use]
pub fn resolve(capabilities: &CapabilitySet) -> ResolvedEntities {
    ResolvedEntities {
        climate: resolve_climate(capabilities),
        switches: resolve_switches(capabilities),
    }
}

fn resolve_climate(capabilities: &CapabilitySet) -> ClimateConfig {
    let mut features = ClimateFeatures::TARGET_TEMPERATURE;

    // "off" is not a device mode; it is always exposed and always first.
    let mut hvac_modes = vec!["off".to_string()];
    hvac_modes.extend(
        capabilities
            .operational_modes
            .iter()
            .map(|m| m.label().to_string()),
    );

    let fan_modes: Vec<String> = capabilities
        .fan_speeds
        .iter()
        .map(|s| s.label().to_string())
        .collect();
    if !fan_modes.is_empty() {
        features |= ClimateFeatures::FAN_MODE;
    }

    // A list holding only the Off sentinel means the louver is fixed; the
    // entity then advertises no swing options at all.
    let swing_selectable = capabilities
        .swing_modes
        .iter()
        .any(|m| *m != SwingMode::Off);
    let swing_modes: Vec<String> = if swing_selectable {
        capabilities
            .swing_modes
            .iter()
            .map(|m| m.label().to_string())
            .collect()
    } else {
        Vec::new()
    };
    if swing_selectable {
        features |= ClimateFeatures::SWING_MODE;
    }

    // Each true flag contributes exactly one preset; the list is the union.
    let mut preset_modes = Vec::new();
    if capabilities.supports_eco {
        preset_modes.push(Preset::Eco.label().to_string());
    }
    if capabilities.supports_turbo {
        preset_modes.push(Preset::Boost.label().to_string());
    }
    if capabilities.supports_sleep {
        preset_modes.push(Preset::Sleep.label().to_string());
    }
    if !preset_modes.is_empty() {
        features |= ClimateFeatures::PRESET_MODE;
    }

    ClimateConfig {
        features,
        hvac_modes,
        fan_modes,
        swing_modes,
        preset_modes,
        temperature_step: capabilities.target_temperature_step,
        min_target_temperature: capabilities.min_target_temperature,
        max_target_temperature: capabilities.max_target_temperature,
    }
}

fn resolve_switches(capabilities: &CapabilitySet) -> Vec<SwitchConfig> {
    let mut switches = Vec::new();

    // A switch is a faithful rendering only for a true binary toggle. Three
    // or more purifier modes go through a multi-value option instead.
    if let [on, off] = capabilities.purifier_modes.as_slice() {
        switches.push(SwitchConfig {
            property: SwitchProperty::Purifier,
            name: "purifier".to_string(),
            on_code: on.code,
            off_code: off.code,
        });
    }

    if capabilities.supports_display_control {
        switches.push(SwitchConfig {
            property: SwitchProperty::Display,
            name: "display".to_string(),
            on_code: 1,
            off_code: 0,
        });
    }

    switches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chillhub_domain::capability::{FanSpeed, OperationalMode, ValueCode};

    fn bare_capabilities() -> CapabilitySet {
        CapabilitySet {
            operational_modes: vec![OperationalMode::Auto],
            fan_speeds: Vec::new(),
            swing_modes: Vec::new(),
            purifier_modes: Vec::new(),
            supports_eco: false,
            supports_turbo: false,
            supports_sleep: false,
            supports_display_control: false,
            ..CapabilitySet::default()
        }
    }

    #[test]
    fn should_always_expose_off_first_in_hvac_modes() {
        let resolved = resolve(&CapabilitySet::default());
        assert_eq!(resolved.climate.hvac_modes[0], "off");
        assert_eq!(
            resolved.climate.hvac_modes,
            vec!["off", "auto", "cool", "dry", "heat", "fan_only"]
        );
    }

    #[test]
    fn should_enable_fan_feature_for_single_auto_speed() {
        let caps = CapabilitySet {
            fan_speeds: vec![FanSpeed::Auto],
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        assert!(
            resolved
                .climate
                .features
                .contains(ClimateFeatures::FAN_MODE)
        );
        assert_eq!(resolved.climate.fan_modes, vec!["auto"]);
    }

    #[test]
    fn should_disable_fan_feature_for_empty_speed_set() {
        let resolved = resolve(&bare_capabilities());
        assert!(
            !resolved
                .climate
                .features
                .contains(ClimateFeatures::FAN_MODE)
        );
        assert!(resolved.climate.fan_modes.is_empty());
    }

    #[test]
    fn should_preserve_device_order_of_fan_speeds() {
        let caps = CapabilitySet {
            fan_speeds: vec![FanSpeed::High, FanSpeed::Silent, FanSpeed::Auto],
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        assert_eq!(resolved.climate.fan_modes, vec!["high", "silent", "auto"]);
    }

    #[test]
    fn should_treat_off_only_swing_as_no_swing() {
        let caps = CapabilitySet {
            swing_modes: vec![SwingMode::Off],
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        assert!(
            !resolved
                .climate
                .features
                .contains(ClimateFeatures::SWING_MODE)
        );
        assert!(resolved.climate.swing_modes.is_empty());
    }

    #[test]
    fn should_enable_swing_when_a_real_position_exists() {
        let caps = CapabilitySet {
            swing_modes: vec![SwingMode::Off, SwingMode::Both],
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        assert!(
            resolved
                .climate
                .features
                .contains(ClimateFeatures::SWING_MODE)
        );
        assert_eq!(resolved.climate.swing_modes, vec!["off", "both"]);
    }

    #[test]
    fn should_union_preset_flags() {
        let caps = CapabilitySet {
            supports_eco: true,
            supports_sleep: true,
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        assert!(
            resolved
                .climate
                .features
                .contains(ClimateFeatures::PRESET_MODE)
        );
        assert_eq!(resolved.climate.preset_modes, vec!["eco", "sleep"]);
    }

    #[test]
    fn should_contribute_single_preset_for_single_flag() {
        let caps = CapabilitySet {
            supports_eco: true,
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        assert_eq!(resolved.climate.preset_modes, vec!["eco"]);
    }

    #[test]
    fn should_disable_presets_when_no_flag_set() {
        let resolved = resolve(&bare_capabilities());
        assert!(
            !resolved
                .climate
                .features
                .contains(ClimateFeatures::PRESET_MODE)
        );
        assert!(resolved.climate.preset_modes.is_empty());
    }

    #[test]
    fn should_materialise_purifier_switch_for_exactly_two_modes() {
        let caps = CapabilitySet {
            purifier_modes: vec![ValueCode::new(1, "Mode1"), ValueCode::new(2, "Mode2")],
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        let purifier = resolved
            .switches
            .iter()
            .find(|s| s.property == SwitchProperty::Purifier)
            .expect("purifier switch should exist");
        assert_eq!(purifier.on_code, 1);
        assert_eq!(purifier.off_code, 2);
    }

    #[test]
    fn should_not_materialise_purifier_switch_for_three_modes() {
        let caps = CapabilitySet {
            purifier_modes: vec![
                ValueCode::new(1, "Mode1"),
                ValueCode::new(2, "Mode2"),
                ValueCode::new(3, "Mode3"),
            ],
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        assert!(
            !resolved
                .switches
                .iter()
                .any(|s| s.property == SwitchProperty::Purifier)
        );
    }

    #[test]
    fn should_not_materialise_purifier_switch_for_single_mode() {
        let caps = CapabilitySet {
            purifier_modes: vec![ValueCode::new(1, "Mode1")],
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        assert!(resolved.switches.is_empty());
    }

    #[test]
    fn should_materialise_display_switch_from_capability_flag() {
        let caps = CapabilitySet {
            supports_display_control: true,
            ..bare_capabilities()
        };
        let resolved = resolve(&caps);
        let display = resolved
            .switches
            .iter()
            .find(|s| s.property == SwitchProperty::Display)
            .expect("display switch should exist");
        assert_eq!(display.name, "display");
    }

    #[test]
    fn should_copy_temperature_bounds_from_capabilities() {
        let resolved = resolve(&CapabilitySet::default());
        assert_eq!(resolved.climate.temperature_step, 1.0);
        assert_eq!(resolved.climate.min_target_temperature, 17.0);
        assert_eq!(resolved.climate.max_target_temperature, 30.0);
        assert!(
            resolved
                .climate
                .features
                .contains(ClimateFeatures::TARGET_TEMPERATURE)
        );
    }

    #[test]
    fn should_be_idempotent() {
        let caps = CapabilitySet::default();
        assert_eq!(resolve(&caps), resolve(&caps));
    }
}
