//! Alert Coordinator Implementation

use crate::message::{alert_message, recovery_message};
use crate::model::{AlertState, Outcome, ServerAlertRecord, ServerStatus, StatusEvent};
use crate::store::{AlertConfigStore, AlertStateStore};
use crate::AlertError;
use chrono::Utc;
use notifier::NotificationChannel;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Decides, per status event, whether to alert, suppress or post a recovery.
///
/// The state store sits behind a single process-wide lock held for the whole
/// decision, including the outbound channel call, so two reports can never
/// both observe "no open alert" for the same server. This assumes one
/// process owns the state file.
pub struct AlertCoordinator {
    /// Alert on/off switch
    config: AlertConfigStore,
    /// Open alerts, guarded for the full read-decide-write cycle
    state: Mutex<AlertStateStore>,
    /// Destination for alerts; `None` when credentials are missing
    channel: Option<Arc<dyn NotificationChannel>>,
}

impl AlertCoordinator {
    /// Create a new coordinator
    pub fn new(
        config: AlertConfigStore,
        state: AlertStateStore,
        channel: Option<Arc<dyn NotificationChannel>>,
    ) -> Self {
        match &channel {
            Some(channel) => info!("Alert coordinator using channel '{}'", channel.name()),
            None => warn!("Alert coordinator has no notification channel configured"),
        }
        Self {
            config,
            state: Mutex::new(state),
            channel,
        }
    }

    /// Configuration store
    pub fn config(&self) -> &AlertConfigStore {
        &self.config
    }

    /// Whether a notification channel is configured
    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    /// Snapshot of currently open alerts
    pub async fn open_alerts(&self) -> Result<AlertState, AlertError> {
        let store = self.state.lock().await;
        Ok(store.load()?)
    }

    /// Process one status report
    pub async fn process(&self, event: &StatusEvent) -> Result<Outcome, AlertError> {
        let result = self.apply(event).await;

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(AlertError::InvalidRequest(_)) => "invalid",
            Err(AlertError::ChannelUnavailable) => "unavailable",
            Err(AlertError::SendFailed) => "send_failed",
            Err(AlertError::Storage(_)) => "storage_error",
        };
        metrics::counter!("alert_outcomes_total", "outcome" => label).increment(1);

        result
    }

    async fn apply(&self, event: &StatusEvent) -> Result<Outcome, AlertError> {
        event.validate()?;

        if !self.config.load()?.enabled {
            debug!(
                "Alerts disabled, ignoring {} ({})",
                event.server_id, event.status
            );
            return Ok(Outcome::skipped("alerts disabled"));
        }

        let channel = self
            .channel
            .as_ref()
            .ok_or(AlertError::ChannelUnavailable)?;

        let store = self.state.lock().await;
        let mut state = store.load()?;

        let status = match ServerStatus::parse(&event.status) {
            Some(status) => status,
            None => {
                debug!(
                    "No action for status '{}' of {}",
                    event.status, event.server_id
                );
                return Ok(Outcome::skipped("unhandled status"));
            }
        };

        match status {
            ServerStatus::Alerting(kind) => {
                if let Some(open) = state.get(&event.server_id) {
                    debug!(
                        "Alert suppressed: {} already open as {:?} (now {:?})",
                        event.server_id, open.kind, kind
                    );
                    return Ok(Outcome::skipped("alert already sent"));
                }

                let text = alert_message(kind, event, Utc::now());
                let handle = match channel.post_message(&text).await {
                    Some(handle) => handle,
                    None => {
                        warn!(
                            "Alert for {} ({:?}) was not delivered",
                            event.server_id, kind
                        );
                        return Err(AlertError::SendFailed);
                    }
                };

                state.insert(
                    event.server_id.clone(),
                    ServerAlertRecord {
                        handle: handle.clone(),
                        kind,
                    },
                );
                store.save(&state)?;

                info!(
                    "Alert opened: {} {:?} (handle {})",
                    event.server_id, kind, handle
                );
                Ok(Outcome::Sent { handle })
            }
            ServerStatus::Healthy => {
                let record = match state.remove(&event.server_id) {
                    Some(record) => record,
                    None => return Ok(Outcome::skipped("no prior alert")),
                };

                let text = recovery_message(record.kind, event, Utc::now());
                channel.reply_in_thread(&record.handle, &text).await;
                store.save(&state)?;

                info!("Alert closed: {} (was {:?})", event.server_id, record.kind);
                Ok(Outcome::Recovered)
            }
        }
    }
}
