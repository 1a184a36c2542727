use thiserror::Error;

use cordvault_core::error::{AppError, ErrorKind};

/// Discord error code for a message that does not exist.
pub(crate) const UNKNOWN_MESSAGE: u64 = 10008;
/// Discord error code for a channel the bot cannot see.
pub(crate) const MISSING_ACCESS: u64 = 50001;
/// Discord error code for an action the bot is not allowed to take.
pub(crate) const MISSING_PERMISSIONS: u64 = 50013;

/// Errors raised while talking to the Discord REST API.
///
/// Converted into [`AppError`] at the [`BlobStore`] boundary.
///
/// [`BlobStore`]: cordvault_core::traits::BlobStore
#[derive(Debug, Error)]
pub enum DiscordError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Discord answered with a non-success status.
    #[error("Discord API error (HTTP {status}, code {code:?}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Discord JSON error code, when the body carried one.
        code: Option<u64>,
        /// Error message or raw body.
        message: String,
    },

    /// The message exists but carries no attachment.
    #[error("message {0} has no attachment")]
    MissingAttachment(String),

    /// HTTP 429.
    #[error("rate limited by Discord")]
    RateLimited,
}

impl DiscordError {
    /// A definitive "this message does not exist" answer.
    pub fn is_unknown_message(&self) -> bool {
        match self {
            Self::Api { code, status, .. } => {
                *code == Some(UNKNOWN_MESSAGE) || (*status == 404 && code.is_none())
            }
            _ => false,
        }
    }

    /// The bot lacks access to the channel or permission for the action.
    pub fn is_access_denied(&self) -> bool {
        match self {
            Self::Api { code, status, .. } => {
                matches!(code, Some(MISSING_ACCESS | MISSING_PERMISSIONS))
                    || (*status == 403 && code.is_none())
            }
            _ => false,
        }
    }
}

impl From<DiscordError> for AppError {
    fn from(err: DiscordError) -> Self {
        let kind = match &err {
            DiscordError::Api { status, .. } if err.is_access_denied() || *status == 413 => {
                ErrorKind::BackendRejected
            }
            DiscordError::Api { status, .. } if (400..500).contains(status) && *status != 404 => {
                ErrorKind::BackendRejected
            }
            _ => ErrorKind::BackendUnavailable,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
