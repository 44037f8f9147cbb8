//! Submission Pipeline
//!
//! Validate → disable the submit control → send → interpret the JSON
//! envelope → alert (and maybe redirect) → restore the control.
//!
//! The control is restored on every exit, including when the submit future
//! is dropped mid-flight. Failures never surface as `Err`; they come back as
//! [`SubmitOutcome::Failed`] after the user has been told.

pub mod navigator;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;

pub use navigator::{HistoryNavigator, Navigator};
pub use transport::{FormPayload, HttpTransport, ServerResponse, Transport};

use super::alerts::{AlertSeverity, NotificationSink};
use super::form::{Form, SubmitButton};
use super::validation::{FormValidator, ValidationReport};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unreadable response: {0}")]
    Parse(String),

    #[error("Server rejected the submission: {}", .0.as_deref().unwrap_or("no message"))]
    ServerRejection(Option<String>),

    #[error("Invalid form action: {0}")]
    InvalidAction(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SubmitError {
    /// Network, decoding and request-building failures, as opposed to an
    /// explicit `success: false` from the server.
    pub fn is_transport(&self) -> bool {
        !matches!(self, SubmitError::ServerRejection(_))
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SubmitError::Parse(e.to_string())
        } else {
            SubmitError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SubmitError {
    fn from(e: serde_json::Error) -> Self {
        SubmitError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SubmitError>;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Grace period before following a `redirect`, in milliseconds
    pub redirect_delay_ms: u64,
    /// Header marking the request as programmatic
    pub request_header: String,
    pub request_header_value: String,
    /// Submit button content while a request is in flight
    pub busy_label: String,
    pub success_message: String,
    pub failure_message: String,
    pub timeout_ms: u64,
    /// Run validation before auto-submitting freshly staged files
    pub validate_auto_submit: bool,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            redirect_delay_ms: 1500,
            request_header: "X-Requested-With".to_string(),
            request_header_value: "XMLHttpRequest".to_string(),
            busy_label: r#"<span class="loading-spinner me-2"></span>Processing..."#.to_string(),
            success_message: "Operation completed successfully!".to_string(),
            failure_message: "An error occurred. Please try again.".to_string(),
            timeout_ms: 30_000,
            validate_auto_submit: false,
        }
    }
}

impl SubmissionConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ============================================================================
// State & Outcome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitState {
    Idle,
    Validating,
    Invalid,
    Submitting,
    Succeeded,
    Failed,
}

/// What started the submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The user pressed submit; validated forms are checked first.
    User,
    /// Files were staged into an auto-submit form.
    AutoStage,
    /// Called through the public API; never validated.
    Programmatic,
}

/// A navigation waiting out the grace delay
#[derive(Debug)]
pub struct PendingRedirect {
    pub target: String,
    pub delay: Duration,
    handle: JoinHandle<()>,
}

impl PendingRedirect {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait until the navigation has happened.
    pub async fn completed(self) {
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "redirect task did not complete");
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(ValidationReport),
    Succeeded {
        message: String,
        response: ServerResponse,
        redirect: Option<PendingRedirect>,
    },
    Failed {
        message: String,
        error: SubmitError,
    },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded { .. })
    }

    fn terminal_state(&self) -> SubmitState {
        match self {
            SubmitOutcome::Invalid(_) => SubmitState::Invalid,
            SubmitOutcome::Succeeded { .. } => SubmitState::Succeeded,
            SubmitOutcome::Failed { .. } => SubmitState::Failed,
        }
    }
}

// ============================================================================
// Busy state
// ============================================================================

/// Disable the submit control and swap in the busy label. Returns the label
/// that was replaced.
fn engage_busy(button: Option<&mut SubmitButton>, busy_label: &str) -> Option<String> {
    button.map(|button| {
        button.disabled = true;
        std::mem::replace(&mut button.label, busy_label.to_string())
    })
}

fn restore_button(button: Option<&mut SubmitButton>, original: Option<String>) {
    if let (Some(button), Some(label)) = (button, original) {
        button.disabled = false;
        button.label = label;
    }
}

/// Puts the submit control back when dropped, so a cancelled attempt does
/// not leave it disabled.
pub(crate) struct RestoreGuard<'a> {
    button: Option<&'a mut SubmitButton>,
    original: Option<String>,
}

impl<'a> RestoreGuard<'a> {
    pub(crate) fn new(button: Option<&'a mut SubmitButton>, original: Option<String>) -> Self {
        Self { button, original }
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        restore_button(self.button.take(), self.original.take());
    }
}

/// One attempt between `prepare` and `settle`. The form's submit control
/// stays busy for as long as the ticket is out.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub form_id: String,
    original_label: Option<String>,
}

/// A validated, busy form's request, ready to hand to a transport.
#[derive(Debug)]
pub struct Prepared {
    pub payload: FormPayload,
    pub ticket: SubmitTicket,
}

// ============================================================================
// Pipeline
// ============================================================================

pub struct SubmissionPipeline {
    config: SubmissionConfig,
    validator: FormValidator,
    transport: Arc<dyn Transport>,
    alerts: Arc<dyn NotificationSink>,
    navigator: Arc<dyn Navigator>,
}

impl SubmissionPipeline {
    pub fn new(
        config: SubmissionConfig,
        transport: Arc<dyn Transport>,
        alerts: Arc<dyn NotificationSink>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            validator: FormValidator::new(),
            transport,
            alerts,
            navigator,
        }
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    fn should_validate(&self, form: &Form, trigger: SubmitTrigger) -> bool {
        match trigger {
            SubmitTrigger::User => form.validate,
            SubmitTrigger::AutoStage => form.validate && self.config.validate_auto_submit,
            SubmitTrigger::Programmatic => false,
        }
    }

    /// First half of an attempt: validate, serialize, then mark the form
    /// busy. On failure the form is left `Invalid` and nothing is sent.
    ///
    /// Every `Ok` must eventually be passed to [`settle`](Self::settle),
    /// which is what re-enables the submit control.
    pub fn prepare(
        &self,
        form: &mut Form,
        trigger: SubmitTrigger,
    ) -> std::result::Result<Prepared, ValidationReport> {
        if self.should_validate(form, trigger) {
            form.set_state(SubmitState::Validating);
            let report = self.validator.validate(form);
            if !report.is_valid() {
                form.set_state(SubmitState::Invalid);
                return Err(report);
            }
        }

        let payload = FormPayload::from_form(form);
        let original_label = engage_busy(form.submit_button.as_mut(), &self.config.busy_label);
        form.set_state(SubmitState::Submitting);

        Ok(Prepared {
            payload,
            ticket: SubmitTicket {
                form_id: form.id.clone(),
                original_label,
            },
        })
    }

    /// Second half of an attempt: restore the submit control, tell the user
    /// how it went and schedule any redirect.
    ///
    /// Must be called inside a tokio runtime; redirects are scheduled as
    /// tasks on it.
    pub fn settle(
        &self,
        form: &mut Form,
        ticket: SubmitTicket,
        result: Result<ServerResponse>,
    ) -> SubmitOutcome {
        if ticket.form_id != form.id {
            tracing::warn!(ticket = %ticket.form_id, form = %form.id, "settling a ticket on another form");
        }
        restore_button(form.submit_button.as_mut(), ticket.original_label);

        let outcome = self.interpret(&ticket.form_id, result);
        form.set_state(outcome.terminal_state());
        form.set_state(SubmitState::Idle);
        outcome
    }

    /// Run one whole attempt for `form`, waiting on the transport.
    ///
    /// If the returned future is dropped mid-request the submit control is
    /// still restored.
    pub async fn submit(&self, form: &mut Form, trigger: SubmitTrigger) -> SubmitOutcome {
        let Prepared { payload, ticket } = match self.prepare(form, trigger) {
            Ok(prepared) => prepared,
            Err(report) => return SubmitOutcome::Invalid(report),
        };

        let result = {
            let _restore = RestoreGuard::new(form.submit_button.as_mut(), ticket.original_label.clone());
            self.transport.send(payload).await
        };

        self.settle(form, ticket, result)
    }

    fn interpret(&self, form_id: &str, result: Result<ServerResponse>) -> SubmitOutcome {
        match result {
            Ok(response) if response.success => {
                let message = response
                    .message
                    .clone()
                    .unwrap_or_else(|| self.config.success_message.clone());
                self.alerts.notify(AlertSeverity::Success, &message);

                let redirect = response
                    .redirect
                    .clone()
                    .map(|target| self.schedule_redirect(target));

                tracing::info!(form = %form_id, redirect = redirect.is_some(), "submission succeeded");
                SubmitOutcome::Succeeded {
                    message,
                    response,
                    redirect,
                }
            }
            Ok(response) => {
                let message = response
                    .message
                    .clone()
                    .unwrap_or_else(|| self.config.failure_message.clone());
                self.alerts.notify(AlertSeverity::Danger, &message);

                tracing::error!(form = %form_id, message = %message, "submission rejected by server");
                SubmitOutcome::Failed {
                    message,
                    error: SubmitError::ServerRejection(response.message),
                }
            }
            Err(error) => {
                let message = self.config.failure_message.clone();
                self.alerts.notify(AlertSeverity::Danger, &message);

                tracing::error!(form = %form_id, error = %error, "submission failed");
                SubmitOutcome::Failed { message, error }
            }
        }
    }

    fn schedule_redirect(&self, target: String) -> PendingRedirect {
        let delay = self.config.redirect_delay();
        let navigator = Arc::clone(&self.navigator);
        let to = target.clone();

        tracing::info!(to = %target, delay_ms = delay.as_millis() as u64, "redirect scheduled");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(&to);
        });

        PendingRedirect {
            target,
            delay,
            handle,
        }
    }
}
