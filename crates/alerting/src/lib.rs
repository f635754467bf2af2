//! Alerting System
//!
//! Turns a stream of per-server status reports into at most one open alert
//! per server, with recovery replies threaded under the original alert.

mod coordinator;
mod message;
mod model;
mod store;

pub use coordinator::AlertCoordinator;
pub use message::{alert_message, recovery_message};
pub use model::{
    AlertConfig, AlertConfigUpdate, AlertKind, AlertState, Metrics, Outcome, ServerAlertRecord,
    ServerStatus, StatusEvent,
};
pub use store::{AlertConfigStore, AlertStateStore};

use storage::StorageError;
use thiserror::Error;

/// Alert processing errors
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Notification channel is not configured")]
    ChannelUnavailable,

    #[error("Failed to send alert")]
    SendFailed,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
