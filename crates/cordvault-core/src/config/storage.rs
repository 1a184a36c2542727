//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Blob backend to use: `"discord"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Maximum upload size in bytes (default 10 MiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// MIME types accepted for upload.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
    /// Upper bound for every backend call, downloads included.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Discord backend configuration.
    #[serde(default)]
    pub discord: DiscordStorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_upload_size_bytes: default_max_upload(),
            allowed_mime_types: default_allowed_mime_types(),
            request_timeout_seconds: default_request_timeout(),
            discord: DiscordStorageConfig::default(),
        }
    }
}

impl StorageConfig {
    /// Whether the given MIME type is on the upload allow-list.
    pub fn is_mime_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }
}

/// Discord bot credentials and target channel.
#[derive(Clone, Serialize, Deserialize)]
pub struct DiscordStorageConfig {
    /// Bot token. When empty the backend never becomes ready.
    #[serde(default)]
    pub bot_token: String,
    /// Channel that receives uploaded attachments.
    #[serde(default)]
    pub channel_id: String,
    /// REST API base URL.
    #[serde(default = "default_api_base")]
    pub api_base_url: String,
}

impl Default for DiscordStorageConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            api_base_url: default_api_base(),
        }
    }
}

impl std::fmt::Debug for DiscordStorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordStorageConfig")
            .field("bot_token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn default_provider() -> String {
    "discord".to_string()
}

fn default_max_upload() -> u64 {
    10_485_760 // 10 MiB
}

fn default_allowed_mime_types() -> Vec<String> {
    [
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
        "application/pdf",
        "text/plain",
        "application/json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}
