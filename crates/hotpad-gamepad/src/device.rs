use sdl2::controller::{Button as SdlButton, GameController};
use sdl2::joystick::Joystick;

use crate::{GamepadError, Result};

/// Unique identifier of an opened device, stable until it disconnects.
pub type InstanceId = u32;

/// Platform-named buttons used by role mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadButton {
    Back,
    Start,
}

impl PadButton {
    fn to_sdl(self) -> SdlButton {
        match self {
            Self::Back => SdlButton::Back,
            Self::Start => SdlButton::Start,
        }
    }
}

/// An opened input device, tagged by how it addresses buttons.
///
/// The style is probed once at open time: devices the backend recognizes as
/// conforming to the common gamepad layout expose named buttons, everything
/// else is indexed-only. A standardized device keeps its joystick handle too,
/// since the GUID and indexed reads are only reachable through it.
pub enum Device {
    Standardized {
        controller: GameController,
        joystick: Joystick,
    },
    Raw {
        joystick: Joystick,
    },
}

impl Device {
    pub fn is_standardized(&self) -> bool {
        matches!(self, Self::Standardized { .. })
    }

    fn joystick(&self) -> &Joystick {
        match self {
            Self::Standardized { joystick, .. } | Self::Raw { joystick } => {
                joystick
            }
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.joystick().instance_id()
    }

    pub fn name(&self) -> String {
        match self {
            Self::Standardized { controller, .. } => controller.name(),
            Self::Raw { joystick } => joystick.name(),
        }
    }

    /// Canonical raw GUID as reported by the backend (32 lowercase hex chars).
    pub fn guid(&self) -> String {
        self.joystick().guid().string()
    }

    pub fn num_buttons(&self) -> u32 {
        self.joystick().num_buttons()
    }

    /// Reads a button by zero-based index. Fails when the index is out of
    /// range or the device has gone away.
    pub fn button_by_index(&self, index: u32) -> Result<bool> {
        self.joystick()
            .button(index)
            .map_err(|e| GamepadError::Native(e.to_string()))
    }

    /// Reads a platform-named button. Always `false` on raw joysticks, which
    /// have no standard layout to name buttons by.
    pub fn named_button(&self, button: PadButton) -> bool {
        match self {
            Self::Standardized { controller, .. } => {
                controller.button(button.to_sdl())
            }
            Self::Raw { .. } => false,
        }
    }

    /// Liveness probe: whether the underlying handle still maps to attached
    /// hardware.
    pub fn attached(&self) -> bool {
        match self {
            Self::Standardized {
                controller,
                joystick,
            } => controller.attached() && joystick.attached(),
            Self::Raw { joystick } => joystick.attached(),
        }
    }

    pub fn has_rumble(&self) -> bool {
        self.joystick().has_rumble()
    }

    /// Rumble on a standardized pad. `low` and `high` are raw motor
    /// magnitudes. Unsupported on raw joysticks, which rumble through a
    /// haptic handle instead.
    pub fn set_rumble(&mut self, low: u16, high: u16, ms: u32) -> Result<()> {
        match self {
            Self::Standardized { controller, .. } => controller
                .set_rumble(low, high, ms)
                .map_err(|e| GamepadError::Native(e.to_string())),
            Self::Raw { .. } => Err(GamepadError::Unsupported),
        }
    }
}
