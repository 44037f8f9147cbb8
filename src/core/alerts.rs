//! Alert System Module
//!
//! Transient, self-dismissing notifications rendered into a fixed-position
//! container. The `AlertCenter` is constructed once at startup and handed to
//! whatever needs to raise alerts.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dom::Element;
use super::format::escape_html;

// ============================================================================
// Types
// ============================================================================

/// Alert severity, named after the bootstrap contextual classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Success,
    Info,
    Warning,
    Danger,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Success => "success",
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Danger => "danger",
        }
    }
}

/// An alert currently on screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: AlertSeverity,
    pub message: String,
    /// How long the alert stays before removing itself
    #[serde(with = "duration_ms")]
    pub ttl: Duration,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn render_html(&self) -> String {
        format!(
            concat!(
                r#"<div class="alert alert-{} alert-dismissible fade show" data-alert-id="{}">"#,
                "{}",
                r#"<button type="button" class="btn-close" data-bs-dismiss="alert"></button>"#,
                "</div>"
            ),
            self.severity.as_str(),
            self.id,
            escape_html(&self.message)
        )
    }
}

/// Alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Default time-to-live in milliseconds
    pub ttl_ms: u64,
    /// Oldest alerts are dropped beyond this many
    pub max_visible: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 5000,
            max_visible: 10,
        }
    }
}

impl AlertConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Anything that can put a message in front of the user.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    /// Show a message with the sink's default lifetime; returns the alert id.
    fn notify(&self, severity: AlertSeverity, message: &str) -> String;
}

// ============================================================================
// Alert Center
// ============================================================================

/// Owns the alert container and the alerts inside it
#[derive(Debug, Clone)]
pub struct AlertCenter {
    config: AlertConfig,
    alerts: Arc<RwLock<Vec<Alert>>>,
}

impl AlertCenter {
    pub fn new() -> Self {
        Self::with_config(AlertConfig::default())
    }

    pub fn with_config(config: AlertConfig) -> Self {
        Self {
            config,
            alerts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Show an alert. It removes itself after `ttl` (or the configured
    /// default) unless dismissed first.
    pub fn show(&self, severity: AlertSeverity, message: &str, ttl: Option<Duration>) -> String {
        let alert = Alert {
            id: uuid::Uuid::new_v4().to_string(),
            severity,
            message: message.to_string(),
            ttl: ttl.unwrap_or_else(|| self.config.ttl()),
            created_at: Utc::now(),
        };
        let id = alert.id.clone();
        let ttl = alert.ttl;

        log_alert(&alert);

        {
            let mut alerts = self.alerts.write().unwrap_or_else(PoisonError::into_inner);
            alerts.push(alert);
            if alerts.len() > self.config.max_visible {
                let overflow = alerts.len() - self.config.max_visible;
                alerts.drain(0..overflow);
            }
        }

        self.schedule_removal(id.clone(), ttl);
        id
    }

    fn schedule_removal(&self, id: String, ttl: Duration) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let alerts = Arc::clone(&self.alerts);
                handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    if remove_alert(&alerts, &id) {
                        tracing::trace!(alert_id = %id, "alert expired");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(alert_id = %id, "no async runtime; alert stays until dismissed");
            }
        }
    }

    /// Manual dismissal. Safe to call for alerts that are already gone.
    pub fn dismiss(&self, id: &str) -> bool {
        remove_alert(&self.alerts, id)
    }

    pub fn visible(&self) -> Vec<Alert> {
        self.alerts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// The fixed top-right container element.
    pub fn container(&self) -> Element {
        let mut container = Element::new("div")
            .with_id("alert-container")
            .with_class("position-fixed")
            .with_class("top-0")
            .with_class("end-0")
            .with_class("p-3");
        container.set_style("z-index", "9999");
        let html: String = self.visible().iter().map(Alert::render_html).collect();
        container.set_inner_html(html);
        container
    }
}

impl Default for AlertCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for AlertCenter {
    fn notify(&self, severity: AlertSeverity, message: &str) -> String {
        self.show(severity, message, None)
    }
}

fn remove_alert(alerts: &RwLock<Vec<Alert>>, id: &str) -> bool {
    let mut alerts = alerts.write().unwrap_or_else(PoisonError::into_inner);
    let before = alerts.len();
    alerts.retain(|a| a.id != id);
    alerts.len() != before
}

fn log_alert(alert: &Alert) {
    match alert.severity {
        AlertSeverity::Success | AlertSeverity::Info => {
            tracing::info!(alert_id = %alert.id, severity = alert.severity.as_str(), "Alert: {}", alert.message);
        }
        AlertSeverity::Warning | AlertSeverity::Danger => {
            tracing::warn!(alert_id = %alert.id, severity = alert.severity.as_str(), "Alert: {}", alert.message);
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
