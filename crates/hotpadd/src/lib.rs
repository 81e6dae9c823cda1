pub mod detector;
pub mod logging;
pub mod service;

mod error;
mod haptics;
mod poller;
mod registry;

pub use crate::detector::Retrigger;
pub use crate::error::ServiceError;
pub use crate::service::{HotkeyCallback, HotkeyService, ServiceConfig};
