//! Mock implementations for testing
//!
//! `MockTransport`, `MockNavigator`, `MockNotificationSink` and
//! `MockChartLibrary` are generated next to their traits with mockall.
//! The fakes here cover what expectations express badly: recording every
//! alert, a request that never finishes and one that waits to be let go.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::core::alerts::{AlertSeverity, NotificationSink};
use crate::core::logging;
use crate::core::submission::{
    FormPayload, Navigator, ServerResponse, SubmissionConfig, SubmissionPipeline, Transport,
};
use crate::core::submission::Result as SubmitResult;

pub use crate::core::submission::navigator::MockNavigator;
pub use crate::core::submission::transport::MockTransport;

// ============================================================================
// Notification Sink
// ============================================================================

/// Keeps every alert it is asked to show.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    shown: Arc<Mutex<Vec<(AlertSeverity, String)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<(AlertSeverity, String)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(AlertSeverity, String)> {
        self.shown().last().cloned()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, severity: AlertSeverity, message: &str) -> String {
        let mut shown = self.shown.lock().unwrap();
        shown.push((severity, message.to_string()));
        format!("alert-{}", shown.len())
    }
}

// ============================================================================
// Transports
// ============================================================================

/// A request that is accepted and then never answered.
#[derive(Debug, Clone, Default)]
pub struct StalledTransport {
    sent: Arc<Mutex<Vec<FormPayload>>>,
}

impl StalledTransport {
    pub fn sent(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for StalledTransport {
    async fn send(&self, payload: FormPayload) -> SubmitResult<ServerResponse> {
        self.sent.lock().unwrap().push(payload);
        std::future::pending().await
    }
}

/// Holds every request until the test calls [`release`](Self::release),
/// then answers with `response`.
#[derive(Debug, Clone)]
pub struct GatedTransport {
    gate: Arc<Notify>,
    response: ServerResponse,
    sent: Arc<Mutex<Vec<FormPayload>>>,
}

impl GatedTransport {
    pub fn new(response: ServerResponse) -> Self {
        Self {
            gate: Arc::new(Notify::new()),
            response,
            sent: Arc::default(),
        }
    }

    /// Let one waiting (or the next) request through.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn sent(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(&self, payload: FormPayload) -> SubmitResult<ServerResponse> {
        self.sent.lock().unwrap().push(payload);
        self.gate.notified().await;
        Ok(self.response.clone())
    }
}

// ============================================================================
// Pipeline helpers
// ============================================================================

pub fn pipeline_with(
    transport: impl Transport + 'static,
    sink: &RecordingSink,
    navigator: impl Navigator + 'static,
) -> SubmissionPipeline {
    pipeline_with_config(SubmissionConfig::default(), transport, sink, navigator)
}

pub fn pipeline_with_config(
    config: SubmissionConfig,
    transport: impl Transport + 'static,
    sink: &RecordingSink,
    navigator: impl Navigator + 'static,
) -> SubmissionPipeline {
    logging::init_for_tests();
    SubmissionPipeline::new(
        config,
        Arc::new(transport),
        Arc::new(sink.clone()),
        Arc::new(navigator),
    )
}
