//! Alert Data Model

use crate::AlertError;
use notifier::MessageHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status kinds that require operator attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Critical,
    Offline,
}

impl AlertKind {
    /// Human-readable label used in messages
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::Warning => "Warning",
            AlertKind::Critical => "Critical",
            AlertKind::Offline => "Offline",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            AlertKind::Warning => "🟡",
            AlertKind::Critical => "🔴",
            AlertKind::Offline => "⚫",
        }
    }
}

/// Parsed value of a status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Alerting(AlertKind),
    Healthy,
}

impl ServerStatus {
    /// Parse a wire status; unknown values yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "warning" => Some(ServerStatus::Alerting(AlertKind::Warning)),
            "critical" => Some(ServerStatus::Alerting(AlertKind::Critical)),
            "offline" => Some(ServerStatus::Alerting(AlertKind::Offline)),
            "healthy" => Some(ServerStatus::Healthy),
            _ => None,
        }
    }
}

/// Resource usage snapshot, each value a percentage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<f64>,
}

/// A status report for one server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    #[serde(default)]
    pub server_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

impl StatusEvent {
    pub fn new(server_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Name shown in messages, falling back to the server id
    pub fn display_name(&self) -> &str {
        match self.server_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.server_id,
        }
    }

    /// Reject events missing a server id or status
    pub fn validate(&self) -> Result<(), AlertError> {
        if self.server_id.is_empty() {
            return Err(AlertError::InvalidRequest("serverId is required".to_string()));
        }
        if self.status.is_empty() {
            return Err(AlertError::InvalidRequest("status is required".to_string()));
        }
        Ok(())
    }
}

/// The open alert for one server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAlertRecord {
    /// Handle of the posted alert, anchors the recovery reply
    pub handle: MessageHandle,
    /// Kind of the alert that opened the record
    pub kind: AlertKind,
}

/// All open alerts keyed by server id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertState {
    records: BTreeMap<String, ServerAlertRecord>,
}

impl AlertState {
    pub fn get(&self, server_id: &str) -> Option<&ServerAlertRecord> {
        self.records.get(server_id)
    }

    pub fn contains(&self, server_id: &str) -> bool {
        self.records.contains_key(server_id)
    }

    pub fn insert(&mut self, server_id: impl Into<String>, record: ServerAlertRecord) {
        self.records.insert(server_id.into(), record);
    }

    pub fn remove(&mut self, server_id: &str) -> Option<ServerAlertRecord> {
        self.records.remove(server_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ServerAlertRecord)> {
        self.records.iter()
    }
}

fn default_enabled() -> bool {
    true
}

/// Alert configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Whether status events are forwarded to the channel at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Partial configuration update; unknown fields are ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertConfigUpdate {
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl AlertConfigUpdate {
    /// The full configuration, when every field is supplied
    pub fn complete(&self) -> Option<AlertConfig> {
        self.enabled.map(|enabled| AlertConfig { enabled })
    }
}

impl AlertConfig {
    /// Merge recognized fields from `update`
    pub fn apply(&mut self, update: &AlertConfigUpdate) {
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
    }
}

/// Result of processing one status event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// A new alert was posted
    Sent { handle: MessageHandle },
    /// Nothing was sent
    Skipped { reason: String },
    /// A recovery reply was dispatched and the open alert closed
    Recovered,
}

impl Outcome {
    pub(crate) fn skipped(reason: &str) -> Self {
        Outcome::Skipped {
            reason: reason.to_string(),
        }
    }

    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Sent { .. } => "sent",
            Outcome::Skipped { .. } => "skipped",
            Outcome::Recovered => "recovered",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            ServerStatus::parse("critical"),
            Some(ServerStatus::Alerting(AlertKind::Critical))
        );
        assert_eq!(ServerStatus::parse("healthy"), Some(ServerStatus::Healthy));
        assert_eq!(ServerStatus::parse("Critical"), None);
        assert_eq!(ServerStatus::parse("unknown"), None);
    }

    #[test]
    fn test_event_wire_format() {
        let event: StatusEvent = serde_json::from_value(json!({
            "serverId": "db-1",
            "serverName": "DB Node 1",
            "status": "critical",
            "metrics": {"cpu": 95}
        }))
        .unwrap();

        assert_eq!(event.server_id, "db-1");
        assert_eq!(event.display_name(), "DB Node 1");
        assert_eq!(event.metrics.unwrap().cpu, Some(95.0));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        assert_eq!(StatusEvent::new("db-1", "warning").display_name(), "db-1");
        assert_eq!(
            StatusEvent::new("db-1", "warning").with_name("  ").display_name(),
            "db-1"
        );
    }

    #[test]
    fn test_validation() {
        assert!(StatusEvent::new("db-1", "warning").validate().is_ok());
        assert!(matches!(
            StatusEvent::new("", "warning").validate(),
            Err(AlertError::InvalidRequest(_))
        ));
        assert!(matches!(
            StatusEvent::new("db-1", "").validate(),
            Err(AlertError::InvalidRequest(_))
        ));
        // Only empty values are rejected; blank ids are kept as given
        assert!(StatusEvent::new("  ", "warning").validate().is_ok());
    }

    #[test]
    fn test_state_persisted_layout() {
        let mut state = AlertState::default();
        state.insert(
            "db-1",
            ServerAlertRecord {
                handle: MessageHandle::new("1700000000.000100"),
                kind: AlertKind::Offline,
            },
        );

        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({"db-1": {"handle": "1700000000.000100", "kind": "offline"}})
        );
    }

    #[test]
    fn test_config_defaults_and_merge() {
        let config: AlertConfig = serde_json::from_value(json!({})).unwrap();
        assert!(config.enabled);

        let update: AlertConfigUpdate =
            serde_json::from_value(json!({"enabled": false, "channel": "#ops"})).unwrap();
        let mut config = AlertConfig::default();
        config.apply(&update);
        assert!(!config.enabled);

        config.apply(&AlertConfigUpdate::default());
        assert!(!config.enabled);

        assert_eq!(update.complete(), Some(AlertConfig { enabled: false }));
        assert_eq!(AlertConfigUpdate::default().complete(), None);
    }

    #[test]
    fn test_outcome_wire_format() {
        assert_eq!(
            serde_json::to_value(Outcome::skipped("no prior alert")).unwrap(),
            json!({"result": "skipped", "reason": "no prior alert"})
        );
        assert_eq!(
            serde_json::to_value(Outcome::Recovered).unwrap(),
            json!({"result": "recovered"})
        );
    }
}
