use thiserror::Error;

/// Errors surfaced by the hotkey service facade.
///
/// Only native initialization failure reaches the caller; read, mapping and
/// persistence failures are absorbed and logged so one misbehaving device
/// never halts polling of the others.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("native input initialization failed: {0}")]
    NativeInit(String),
    #[error("poll thread is not running")]
    NotRunning,
}
