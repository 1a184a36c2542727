//! Discord-backed blob store.
//!
//! Each blob is a single attachment on a message posted to a configured
//! channel. The `(channel_id, message_id)` pair is the blob reference;
//! attachment URLs are signed and expire, so they are re-read from the
//! message on refresh.

mod error;
mod store;
mod types;

pub use error::DiscordError;
pub use store::DiscordBlobStore;
