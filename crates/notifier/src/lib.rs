//! Notification Channels
//!
//! A channel posts a top-level message and hands back a correlation handle,
//! then accepts replies threaded under that handle. Delivery failures never
//! propagate as errors: a failed post is an absent handle, a failed reply is
//! only logged.

mod slack;

pub use slack::{SlackChannel, SlackConfig, DEFAULT_API_BASE as DEFAULT_SLACK_API_BASE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque identifier of a posted message, used to anchor threaded replies
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageHandle(String);

impl MessageHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised inside a channel client
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Channel API rejected the request: {0}")]
    Api(String),

    #[error("Invalid channel configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Http(err.to_string())
    }
}

/// A destination that supports posting messages and threaded replies.
///
/// The destination (channel id, credentials) is bound into the implementor.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Channel name for logs
    fn name(&self) -> &str;

    /// Post a new top-level message; `None` means the post failed
    async fn post_message(&self, text: &str) -> Option<MessageHandle>;

    /// Reply in the thread anchored at `handle` (best effort)
    async fn reply_in_thread(&self, handle: &MessageHandle, text: &str);
}
