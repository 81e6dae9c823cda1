use std::fmt;
use std::str::FromStr;

use hotpad_gamepad::PadButton;

use crate::MappingError;

/// A single button a role is bound to: either a platform-named button on a
/// standardized pad, or a zero-based index on a raw joystick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonBinding {
    Named(PadButton),
    Index(u32),
}

impl fmt::Display for ButtonBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(PadButton::Back) => write!(f, "Back"),
            Self::Named(PadButton::Start) => write!(f, "Start"),
            Self::Index(i) => write!(f, "Button {i}"),
        }
    }
}

impl FromStr for ButtonBinding {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Back" => Ok(Self::Named(PadButton::Back)),
            "Start" => Ok(Self::Named(PadButton::Start)),
            other => {
                let index = other
                    .strip_prefix("Button ")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| {
                        MappingError::InvalidDescriptor(other.to_string())
                    })?;
                Ok(Self::Index(index))
            }
        }
    }
}

/// The two semantic roles a device needs for combo detection.
///
/// A mapping is expected to be fully named or fully indexed. Mixed mappings
/// are allowed to exist but behave as indexed: a named binding on a raw
/// joystick never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleMapping {
    pub hotkey: ButtonBinding,
    pub start: ButtonBinding,
}

impl RoleMapping {
    /// Default for standardized pads: the common Back+Start combo.
    pub fn standardized_default() -> Self {
        Self {
            hotkey: ButtonBinding::Named(PadButton::Back),
            start: ButtonBinding::Named(PadButton::Start),
        }
    }

    /// Indexed mapping built from community database button numbers.
    pub fn indexed(back: u32, start: u32) -> Self {
        Self {
            hotkey: ButtonBinding::Index(back),
            start: ButtonBinding::Index(start),
        }
    }
}
