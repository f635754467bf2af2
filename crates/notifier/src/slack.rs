//! Slack Web API Channel

use crate::{MessageHandle, NotificationChannel, NotifyError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default Slack Web API base URL
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Slack client configuration
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Web API base URL (overridable for tests and proxies)
    pub api_base: String,
    /// Bot token (`xoxb-...`)
    pub bot_token: String,
    /// Destination channel id
    pub channel_id: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl SlackConfig {
    pub fn new(bot_token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            bot_token: bot_token.into(),
            channel_id: channel_id.into(),
            timeout_secs: 10,
        }
    }
}

/// `chat.postMessage` request body
#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

/// `chat.postMessage` response body
#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Slack channel posting through `chat.postMessage`
#[derive(Debug)]
pub struct SlackChannel {
    client: Client,
    config: SlackConfig,
}

impl SlackChannel {
    /// Create a new Slack channel client
    pub fn new(config: SlackConfig) -> Result<Self, NotifyError> {
        if config.bot_token.is_empty() {
            return Err(NotifyError::Config("bot token is required".to_string()));
        }
        if config.channel_id.is_empty() {
            return Err(NotifyError::Config("channel id is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!("Slack channel configured for {}", config.channel_id);
        Ok(Self { client, config })
    }

    async fn post(
        &self,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<MessageHandle, NotifyError> {
        let url = format!(
            "{}/chat.postMessage",
            self.config.api_base.trim_end_matches('/')
        );
        let body = PostMessageRequest {
            channel: &self.config.channel_id,
            text,
            thread_ts,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.bot_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: PostMessageResponse = response.json().await?;
        match parsed {
            PostMessageResponse { ok: true, ts: Some(ts), .. } => Ok(MessageHandle::new(ts)),
            PostMessageResponse { ok: true, ts: None, .. } => {
                Err(NotifyError::Api("response carried no ts".to_string()))
            }
            PostMessageResponse { error, .. } => Err(NotifyError::Api(
                error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }
}

fn count_failure(operation: &'static str) {
    metrics::counter!(
        "notification_failures_total",
        "channel" => "slack",
        "operation" => operation
    )
    .increment(1);
}

#[async_trait]
impl NotificationChannel for SlackChannel {
    fn name(&self) -> &str {
        "slack"
    }

    async fn post_message(&self, text: &str) -> Option<MessageHandle> {
        match self.post(text, None).await {
            Ok(handle) => {
                debug!("Slack message posted (ts={})", handle);
                Some(handle)
            }
            Err(e) => {
                warn!("Slack post failed: {}", e);
                count_failure("post");
                None
            }
        }
    }

    async fn reply_in_thread(&self, handle: &MessageHandle, text: &str) {
        match self.post(text, Some(handle.as_str())).await {
            Ok(reply) => debug!("Slack reply posted under {} (ts={})", handle, reply),
            Err(e) => {
                warn!("Slack reply under {} failed: {}", handle, e);
                count_failure("reply");
            }
        }
    }
}
