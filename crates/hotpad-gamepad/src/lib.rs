mod context;
mod device;

use thiserror::Error;

pub use crate::context::InputContext;
pub use crate::device::{Device, InstanceId, PadButton};
pub use sdl2::haptic::Haptic;

/// Error type for native input operations.
#[derive(Debug, Error)]
pub enum GamepadError {
    /// Failed to initialize the backend (SDL2 or subsystems).
    #[error("Backend init failed: {0}")]
    Init(String),
    /// Requested device index was not found.
    #[error("Device not found: {0}")]
    NotFound(u32),
    /// Operation is not supported on the current device/backend.
    #[error("Operation unsupported")]
    Unsupported,
    /// A generic backend error.
    #[error("Backend error: {0}")]
    Native(String),
}

/// Convenient result alias for native input operations.
pub type Result<T> = std::result::Result<T, GamepadError>;
