//! Storage provider type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The blob backend a file's bytes live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "storage_provider_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderType {
    /// Attachments on a Discord channel.
    Discord,
    /// Process-local store (development and tests).
    Memory,
}

impl StorageProviderType {
    /// Return the provider type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StorageProviderType {
    type Err = cordvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discord" => Ok(Self::Discord),
            "memory" => Ok(Self::Memory),
            _ => Err(cordvault_core::AppError::validation(format!(
                "Invalid storage provider type: '{s}'. Expected one of: discord, memory"
            ))),
        }
    }
}
