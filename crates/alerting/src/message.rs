//! Alert Message Formatting

use crate::model::{AlertKind, Metrics, StatusEvent};
use chrono::{DateTime, Utc};

/// Text of a new alert: kind, server name and id, provided metrics, time
pub fn alert_message(kind: AlertKind, event: &StatusEvent, at: DateTime<Utc>) -> String {
    let mut lines = vec![format!(
        "{} *[{}]* {} ({})",
        kind.emoji(),
        kind.label(),
        event.display_name(),
        event.server_id
    )];

    if let Some(summary) = event.metrics.as_ref().and_then(metrics_summary) {
        lines.push(summary);
    }
    lines.push(format!("Time: {}", at.format("%Y-%m-%d %H:%M:%S UTC")));

    lines.join("\n")
}

/// Text of the threaded recovery reply, worded by the kind that opened the alert
pub fn recovery_message(previous: AlertKind, event: &StatusEvent, at: DateTime<Utc>) -> String {
    let headline = match previous {
        AlertKind::Offline => format!(
            "🟢 *[Reconnected]* {} ({}) is back online",
            event.display_name(),
            event.server_id
        ),
        AlertKind::Warning | AlertKind::Critical => format!(
            "✅ *[Recovered]* {} ({}) has recovered from {}",
            event.display_name(),
            event.server_id,
            previous.label()
        ),
    };

    format!("{}\nTime: {}", headline, at.format("%Y-%m-%d %H:%M:%S UTC"))
}

/// `CPU: 95% | Memory: 80%`, or `None` when no metric is present
fn metrics_summary(metrics: &Metrics) -> Option<String> {
    let parts: Vec<String> = [
        ("CPU", metrics.cpu),
        ("Memory", metrics.memory),
        ("Disk", metrics.disk),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value.map(|v| format!("{}: {}%", label, round_percent(v)))
    })
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

fn round_percent(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
