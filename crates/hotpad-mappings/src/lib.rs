mod community;
mod guid;
mod role;
mod store;

use thiserror::Error;

pub use crate::community::{CommunityDb, CommunityMapping};
pub use crate::guid::normalize_guid;
pub use crate::role::{ButtonBinding, RoleMapping};
pub use crate::store::{
    load_or_default, resolve, save, upsert, DeviceIdentity, DeviceProfile,
};

/// Error type for mapping parsing and persistence.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("mapping database not found: {0}")]
    FileNotFound(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid button descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Convenient result alias for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;
