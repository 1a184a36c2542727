use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, error, info, instrument, warn};

use cordvault_core::config::DiscordStorageConfig;
use cordvault_core::error::{AppError, ErrorKind};
use cordvault_core::result::AppResult;
use cordvault_core::traits::blob::{BlobRef, BlobStore, DeleteOutcome, StoredBlob};

use super::error::DiscordError;
use super::types::{ApiErrorBody, AttachmentSlot, CreateMessage, CurrentUser, Message};

/// Blob store that keeps each blob as an attachment on a Discord message.
///
/// The store starts out not ready. [`DiscordBlobStore::connect`] validates
/// the bot token and flips the readiness flag; until then every
/// [`BlobStore`] operation fails with `BackendUnavailable`.
#[derive(Debug)]
pub struct DiscordBlobStore {
    config: DiscordStorageConfig,
    client: Client,
    ready: AtomicBool,
}

impl DiscordBlobStore {
    /// Create a store whose HTTP calls are bounded by `timeout`.
    pub fn new(config: DiscordStorageConfig, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
        })?;
        Ok(Self::with_client(config, client))
    }

    /// Create a store with a custom HTTP client.
    pub fn with_client(config: DiscordStorageConfig, client: Client) -> Self {
        Self {
            config,
            client,
            ready: AtomicBool::new(false),
        }
    }

    /// Authenticate the bot and mark the store ready.
    ///
    /// Safe to call again after a failure; a store that never connects
    /// keeps answering `BackendUnavailable`.
    #[instrument(skip(self), fields(provider = "discord"))]
    pub async fn connect(&self) -> AppResult<()> {
        if self.config.bot_token.is_empty() {
            warn!("Discord bot token not provided, blob storage will be unavailable");
            return Err(AppError::configuration("Discord bot token is not configured"));
        }

        let response = self
            .client
            .get(self.endpoint("/users/@me"))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(DiscordError::from)?;
        let user: CurrentUser = check(response)
            .await?
            .json()
            .await
            .map_err(DiscordError::from)?;

        self.ready.store(true, Ordering::SeqCst);
        info!(bot_id = %user.id, bot = %user.username, "Discord bot connected");
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.config.bot_token)
    }

    fn ensure_ready(&self) -> AppResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(AppError::backend_unavailable("Discord bot is not ready"))
        }
    }

    /// The reference's channel, falling back to the configured channel.
    fn channel_of<'a>(&'a self, blob_ref: &'a BlobRef) -> AppResult<&'a str> {
        let channel = if blob_ref.channel_id.is_empty() {
            self.config.channel_id.as_str()
        } else {
            blob_ref.channel_id.as_str()
        };
        if channel.is_empty() {
            return Err(AppError::configuration("Discord channel ID not configured"));
        }
        Ok(channel)
    }

    async fn fetch_message(&self, channel: &str, message_id: &str) -> Result<Message, DiscordError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/channels/{channel}/messages/{message_id}")))
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Turn a non-success response into a [`DiscordError`].
async fn check(response: Response) -> Result<Response, DiscordError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("Discord API rate limit hit");
        return Err(DiscordError::RateLimited);
    }

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ApiErrorBody>(&body).ok();
    Err(DiscordError::Api {
        status: status.as_u16(),
        code: parsed.as_ref().map(|b| b.code),
        message: parsed.map(|b| b.message).unwrap_or(body),
    })
}

fn caption(original_name: &str, size: usize) -> String {
    format!(
        "**File Upload**\n**Original Name:** {original_name}\n**Size:** {:.2} MB\n**Uploaded:** {}",
        size as f64 / 1024.0 / 1024.0,
        chrono::Utc::now().to_rfc3339()
    )
}

#[async_trait]
impl BlobStore for DiscordBlobStore {
    fn provider_type(&self) -> &str {
        "discord"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    #[instrument(skip(self, data), fields(provider = "discord", size = data.len()))]
    async fn put(&self, data: Bytes, name: &str, original_name: &str) -> AppResult<StoredBlob> {
        self.ensure_ready()?;
        let channel = self.config.channel_id.as_str();
        if channel.is_empty() {
            return Err(AppError::configuration("Discord channel ID not configured"));
        }

        let payload = CreateMessage {
            content: caption(original_name, data.len()),
            attachments: vec![AttachmentSlot {
                id: 0,
                filename: name.to_string(),
            }],
        };
        let payload_json = serde_json::to_string(&payload)?;
        let part = reqwest::multipart::Part::bytes(data.to_vec()).file_name(name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("payload_json", payload_json)
            .part("files[0]", part);

        let response = self
            .client
            .post(self.endpoint(&format!("/channels/{channel}/messages")))
            .header("Authorization", self.auth_header())
            .multipart(form)
            .send()
            .await
            .map_err(DiscordError::from)?;
        let message: Message = check(response)
            .await?
            .json()
            .await
            .map_err(DiscordError::from)?;

        let attachment = message
            .attachments
            .first()
            .ok_or_else(|| DiscordError::MissingAttachment(message.id.clone()))?;

        debug!(message_id = %message.id, "Stored blob as Discord attachment");
        Ok(StoredBlob {
            blob_ref: BlobRef::new(message.channel_id.clone(), message.id.clone()),
            access_url: attachment.url.clone(),
            size_bytes: attachment.size.unwrap_or(data.len() as u64),
        })
    }

    #[instrument(skip(self), fields(provider = "discord", blob = %blob_ref))]
    async fn delete(&self, blob_ref: &BlobRef) -> AppResult<DeleteOutcome> {
        self.ensure_ready()?;
        let channel = self.channel_of(blob_ref)?;

        let result = match self
            .client
            .delete(self.endpoint(&format!(
                "/channels/{channel}/messages/{}",
                blob_ref.message_id
            )))
            .header("Authorization", self.auth_header())
            .send()
            .await
        {
            Ok(response) => check(response).await.map(|_| ()),
            Err(e) => Err(DiscordError::from(e)),
        };

        match result {
            Ok(()) => {
                info!("Deleted Discord message");
                Ok(DeleteOutcome::Removed)
            }
            Err(e) if e.is_unknown_message() => {
                warn!("Discord message not found (already deleted)");
                Ok(DeleteOutcome::AlreadyAbsent)
            }
            Err(e) if e.is_access_denied() => {
                error!(error = %e, "Missing access to delete Discord message");
                Ok(DeleteOutcome::Refused)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(provider = "discord", blob = %blob_ref))]
    async fn exists(&self, blob_ref: &BlobRef) -> AppResult<bool> {
        self.ensure_ready()?;
        let channel = self.channel_of(blob_ref)?;

        match self.fetch_message(channel, &blob_ref.message_id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_unknown_message() => Ok(false),
            Err(e) => {
                warn!(error = %e, "Existence check inconclusive, assuming message exists");
                Ok(true)
            }
        }
    }

    #[instrument(skip(self), fields(provider = "discord", blob = %blob_ref))]
    async fn refresh_url(&self, blob_ref: &BlobRef) -> AppResult<String> {
        self.ensure_ready()?;
        let channel = self.channel_of(blob_ref)?;

        let message = self.fetch_message(channel, &blob_ref.message_id).await?;
        message
            .attachments
            .into_iter()
            .next()
            .map(|a| a.url)
            .ok_or_else(|| DiscordError::MissingAttachment(message.id).into())
    }

    #[instrument(skip(self, url), fields(provider = "discord"))]
    async fn download(&self, url: &str) -> AppResult<Bytes> {
        self.ensure_ready()?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::BackendUnavailable, "Failed to download file", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::backend_unavailable(format!(
                "Failed to download file: HTTP {status}"
            )));
        }

        response.bytes().await.map_err(|e| {
            AppError::with_source(ErrorKind::BackendUnavailable, "Failed to read download body", e)
        })
    }
}
