use serde::{Deserialize, Serialize};

/// The subset of a Discord message object the store reads.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Message {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Attachment {
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// `GET /users/@me` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CurrentUser {
    pub id: String,
    pub username: String,
}

/// JSON error body returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: u64,
    #[serde(default)]
    pub message: String,
}

/// `payload_json` part of a create-message multipart request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateMessage {
    pub content: String,
    pub attachments: Vec<AttachmentSlot>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AttachmentSlot {
    pub id: u32,
    pub filename: String,
}
