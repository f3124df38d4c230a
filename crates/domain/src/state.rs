//! Device State — in-memory mirror of the appliance's last-known values.
//!
//! Discrete properties are held as raw wire codes. Decoding happens at the
//! read site so that a code outside the discovered capability set reads as
//! "state unknown" instead of crashing entity code or guessing.

use serde::{Deserialize, Serialize};

use crate::capability::{FanSpeed, OperationalMode, SwingMode};
use crate::entity_config::Preset;

/// Snapshot of every property the appliance reports.
///
/// Owned exclusively by the coordinator; entities only ever see clones.
/// Overwritten wholesale after a successful refresh or apply, never
/// half-updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Unit is running.
    pub power: bool,
    /// Raw operational-mode code.
    pub mode: u8,
    /// Requested target temperature, °C.
    pub target_temperature: f32,
    /// Measured indoor temperature, if the unit reports one.
    pub indoor_temperature: Option<f32>,
    /// Measured outdoor temperature, if the unit reports one.
    pub outdoor_temperature: Option<f32>,
    /// Raw fan-speed code.
    pub fan_speed: u8,
    /// Raw swing-position code.
    pub swing_mode: u8,
    /// Eco preset engaged.
    pub eco: bool,
    /// Turbo/boost preset engaged.
    pub turbo: bool,
    /// Sleep preset engaged.
    pub sleep: bool,
    /// Raw purifier-mode code, when the unit has a purifier stage.
    pub purifier: Option<u8>,
    /// Front-panel display lit.
    pub display_on: bool,
    /// Acknowledge commands with a beep.
    pub beep: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            power: false,
            mode: OperationalMode::Auto.code(),
            target_temperature: 24.0,
            indoor_temperature: None,
            outdoor_temperature: None,
            fan_speed: FanSpeed::Auto.code(),
            swing_mode: SwingMode::Off.code(),
            eco: false,
            turbo: false,
            sleep: false,
            purifier: None,
            display_on: true,
            beep: true,
        }
    }
}

impl DeviceState {
    /// Decoded operational mode; `None` when the code is unrecognised.
    #[must_use]
    pub fn operational_mode(&self) -> Option<OperationalMode> {
        OperationalMode::from_code(self.mode)
    }

    /// Decoded fan speed; `None` when the code is unrecognised.
    #[must_use]
    pub fn fan(&self) -> Option<FanSpeed> {
        FanSpeed::from_code(self.fan_speed)
    }

    /// Decoded swing position; `None` when the code is unrecognised.
    #[must_use]
    pub fn swing(&self) -> Option<SwingMode> {
        SwingMode::from_code(self.swing_mode)
    }

    /// The preset currently engaged, if any.
    ///
    /// Presets are mutually exclusive on the wire; when a confused unit
    /// reports several at once the strongest wins (turbo > eco > sleep).
    #[must_use]
    pub fn active_preset(&self) -> Option<Preset> {
        if self.turbo {
            Some(Preset::Boost)
        } else if self.eco {
            Some(Preset::Eco)
        } else if self.sleep {
            Some(Preset::Sleep)
        } else {
            None
        }
    }

    /// Clear every preset flag; used before engaging a new preset.
    pub fn clear_presets(&mut self) {
        self.eco = false;
        self.turbo = false;
        self.sleep = false;
    }

    /// Engage exactly one preset, clearing the others first.
    pub fn set_preset(&mut self, preset: Preset) {
        self.clear_presets();
        match preset {
            Preset::Eco => self.eco = true,
            Preset::Boost => self.turbo = true,
            Preset::Sleep => self.sleep = true,
        }
    }
}
