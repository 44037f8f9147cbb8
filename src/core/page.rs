//! Page Controller
//!
//! Owns the forms, drop zones and loose elements of one page and turns
//! typed UI events into state changes and effects for the embedder.
//! `App` joins the page with the submission pipeline and the alert center.
//!
//! Event handling never waits on the network or a timer. Requests and the
//! progress-bar fill run as tokio tasks and report back through a channel
//! that the embedder drains with [`App::next_update`], so the page keeps
//! taking events (and shows the busy submit control) while work is pending.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::mpsc;

use super::alerts::{AlertCenter, AlertSeverity};
use super::ambient::{self, IntersectionEntry, ProgressAnimation, ProgressFrame, ScrollAnimator, Tooltip};
use super::charts::{self, ChartLibrary};
use super::dom::Element;
use super::form::Form;
use super::lenient;
use super::render::{self, FitTier, JobFitReport, OfferAnalysis};
use super::staging::{DropZone, DropZoneEvent, StagingError, ZoneEffect};
use super::submission::{
    self, Navigator, Prepared, ServerResponse, SubmissionPipeline, SubmitError, SubmitOutcome,
    SubmitState, SubmitTicket, SubmitTrigger, Transport,
};
use crate::config::UiConfig;

pub const JOB_FIT_SCORE: &str = "job-fit-score";
pub const MATCHING_SKILLS: &str = "matching-skills";
pub const MISSING_SKILLS: &str = "missing-skills";
pub const COVER_LETTER_PREVIEW: &str = "cover-letter-preview";
pub const OFFER_ANALYSIS_CONTAINER: &str = "offer-analysis-container";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum PageError {
    #[error("No form with id '{0}'")]
    UnknownForm(String),

    #[error("No drop zone with id '{0}'")]
    UnknownDropZone(String),

    #[error("No element with id '{0}'")]
    UnknownMount(String),

    #[error("Form '{form}' has no field '{field}'")]
    UnknownField { form: String, field: String },

    #[error("Form '{0}' is already submitting")]
    AlreadySubmitting(String),

    #[error("Submission of form '{0}' never settled")]
    SubmissionLost(String),

    #[error(transparent)]
    Staging(#[from] StagingError),
}

pub type Result<T> = std::result::Result<T, PageError>;

// ============================================================================
// Events & Effects
// ============================================================================

/// Something the user (or the browser) did
#[derive(Debug, Clone)]
pub enum UiEvent {
    DropZone { zone: String, event: DropZoneEvent },
    Input { form: String, field: String, value: String },
    Submit { form: String },
    Intersection(Vec<IntersectionEntry>),
    DismissAlert(String),
}

/// Something the embedder has to carry out or may want to know
#[derive(Debug)]
pub enum Effect {
    PreventDefault,
    OpenFilePicker { zone: String },
    Staged { zone: String, count: usize },
    /// The form is busy and its request is on the wire
    SubmissionStarted { form: String },
    Submitted { form: String, outcome: SubmitOutcome },
    /// A progress bar advanced one frame
    Progress { bar: Option<String>, width: f64 },
    FadedIn(usize),
}

/// Results of background work, applied by [`App::next_update`]
#[derive(Debug)]
enum Update {
    Settled {
        ticket: SubmitTicket,
        result: submission::Result<ServerResponse>,
    },
    Frame { bar: usize, frame: ProgressFrame },
    FillDone,
}

// ============================================================================
// Page
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Page {
    forms: Vec<Form>,
    zones: Vec<DropZone>,
    elements: Vec<Element>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(mut self, form: Form) -> Self {
        self.forms.push(form);
        self
    }

    pub fn with_drop_zone(mut self, zone: DropZone) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn form(&self, id: &str) -> Option<&Form> {
        self.forms.iter().find(|f| f.id == id)
    }

    pub fn form_mut(&mut self, id: &str) -> Option<&mut Form> {
        self.forms.iter_mut().find(|f| f.id == id)
    }

    pub fn drop_zone(&self, id: &str) -> Option<&DropZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.has_id(id))
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.has_id(id))
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    fn mount(&mut self, id: &str) -> Result<&mut Element> {
        self.element_mut(id)
            .ok_or_else(|| PageError::UnknownMount(id.to_string()))
    }
}

/// Paint known payloads from a successful response into the mounts that
/// exist. Returns the ids that were updated.
pub fn route_response(page: &mut Page, response: &ServerResponse) -> Vec<&'static str> {
    let mut updated = Vec::new();

    if let Some(text) = response.extra.get("cover_letter").and_then(lenient::as_text) {
        if let Some(preview) = page.element_mut(COVER_LETTER_PREVIEW) {
            render::update_cover_letter_preview(preview, &text);
            updated.push(COVER_LETTER_PREVIEW);
        }
    }

    if let Some(analysis) = OfferAnalysis::from_payload(&response.extra) {
        if let Some(container) = page.element_mut(OFFER_ANALYSIS_CONTAINER) {
            render::display_offer_analysis(container, &analysis);
            updated.push(OFFER_ANALYSIS_CONTAINER);
        }
    }

    if let Some(report) = JobFitReport::from_payload(&response.extra) {
        if let Some(badge) = page.element_mut(JOB_FIT_SCORE) {
            render::update_job_fit_score(badge, report.fit_score);
            updated.push(JOB_FIT_SCORE);
        }
        if let Some(tags) = page.element_mut(MATCHING_SKILLS) {
            render::create_skill_tags(tags, &report.matching_skills, "matched");
            updated.push(MATCHING_SKILLS);
        }
        if let Some(tags) = page.element_mut(MISSING_SKILLS) {
            render::create_skill_tags(tags, &report.missing_skills, "missing");
            updated.push(MISSING_SKILLS);
        }
    }

    if !updated.is_empty() {
        tracing::debug!(mounts = ?updated, "response payload rendered");
    }
    updated
}

// ============================================================================
// App
// ============================================================================

/// What page-load wiring found and started
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub tooltips: Vec<Tooltip>,
    pub observed: usize,
    pub charts: Vec<&'static str>,
    pub progress_bars: usize,
}

pub struct App {
    config: UiConfig,
    page: Page,
    alerts: AlertCenter,
    pipeline: SubmissionPipeline,
    scroll: ScrollAnimator,
    charts: Option<Arc<dyn ChartLibrary>>,
    updates_tx: mpsc::UnboundedSender<Update>,
    updates_rx: mpsc::UnboundedReceiver<Update>,
    /// Background tasks that have not reported their final update yet
    pending: usize,
}

impl App {
    pub fn new(
        config: UiConfig,
        page: Page,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let alerts = AlertCenter::with_config(config.alerts.clone());
        let pipeline = SubmissionPipeline::new(
            config.submission.clone(),
            transport,
            Arc::new(alerts.clone()),
            navigator,
        );
        let scroll = ScrollAnimator::new(&config.animation);
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();

        Self {
            config,
            page,
            alerts,
            pipeline,
            scroll,
            charts: None,
            updates_tx,
            updates_rx,
            pending: 0,
        }
    }

    pub fn with_chart_library(mut self, library: Arc<dyn ChartLibrary>) -> Self {
        self.charts = Some(library);
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn alerts(&self) -> &AlertCenter {
        &self.alerts
    }

    /// Number of background tasks (requests and the progress fill) still
    /// to report back.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Page-load wiring: tooltips, scroll observation and charts, then start
    /// the progress-bar fill in the background.
    ///
    /// Must be called inside a tokio runtime.
    pub fn load(&mut self) -> LoadReport {
        let tooltips = ambient::activate_tooltips(self.page.elements.iter_mut());
        let observed = self.scroll.observe(self.page.elements.iter());

        let elements = &self.page.elements;
        let charts = charts::init_dashboard_charts(self.charts.as_deref(), |id| {
            elements.iter().any(|e| e.has_id(id))
        });

        let bars = ambient::find_progress_bars(&self.page.elements);
        let progress_bars = bars.len();
        if !bars.is_empty() {
            self.spawn_progress_fill(bars);
        }

        tracing::info!(
            tooltips = tooltips.len(),
            observed,
            charts = charts.len(),
            progress_bars,
            "page wiring ready"
        );

        LoadReport {
            tooltips,
            observed,
            charts,
            progress_bars,
        }
    }

    fn spawn_progress_fill(&mut self, bars: Vec<(usize, f64)>) {
        let steps = self.config.animation.progress_steps;
        let cadence = self.config.animation.progress_cadence();
        let updates = self.updates_tx.clone();
        self.pending += 1;

        tokio::spawn(async move {
            let fills = bars.into_iter().map(|(bar, target)| {
                let updates = updates.clone();
                ambient::play_frames(ProgressAnimation::new(target, steps), cadence, move |frame| {
                    updates.send(Update::Frame { bar, frame }).is_ok()
                })
            });
            join_all(fills).await;
            let _ = updates.send(Update::FillDone);
        });
    }

    /// Handle one UI event. Submissions are only started here; their
    /// outcome arrives later through [`next_update`](Self::next_update).
    ///
    /// Must be called inside a tokio runtime.
    pub fn dispatch(&mut self, event: UiEvent) -> Result<Vec<Effect>> {
        match event {
            UiEvent::DropZone { zone, event } => self.on_drop_zone(&zone, event),
            UiEvent::Input { form, field, value } => {
                let target = self
                    .page
                    .form_mut(&form)
                    .ok_or_else(|| PageError::UnknownForm(form.clone()))?;
                target
                    .field_mut(&field)
                    .ok_or(PageError::UnknownField { form, field })?
                    .set_value(value);
                Ok(Vec::new())
            }
            UiEvent::Submit { form } => {
                let mut effects = vec![Effect::PreventDefault];
                effects.extend(self.start_submission(&form, SubmitTrigger::User)?);
                Ok(effects)
            }
            UiEvent::Intersection(entries) => {
                let faded = self.scroll.handle(&entries, &mut self.page.elements);
                Ok(vec![Effect::FadedIn(faded)])
            }
            UiEvent::DismissAlert(id) => {
                self.alerts.dismiss(&id);
                Ok(Vec::new())
            }
        }
    }

    fn on_drop_zone(&mut self, zone_id: &str, event: DropZoneEvent) -> Result<Vec<Effect>> {
        let Page { forms, zones, .. } = &mut self.page;
        let zone = zones
            .iter_mut()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| PageError::UnknownDropZone(zone_id.to_string()))?;
        let form = forms
            .iter_mut()
            .find(|f| f.id == zone.form_id)
            .ok_or_else(|| PageError::UnknownForm(zone.form_id.clone()))?;

        let zone_effects = zone.handle(event, form)?;
        let form_id = form.id.clone();

        let mut effects = Vec::with_capacity(zone_effects.len());
        for effect in zone_effects {
            match effect {
                ZoneEffect::PreventDefault => effects.push(Effect::PreventDefault),
                ZoneEffect::OpenFilePicker => effects.push(Effect::OpenFilePicker {
                    zone: zone_id.to_string(),
                }),
                ZoneEffect::Staged { count } => effects.push(Effect::Staged {
                    zone: zone_id.to_string(),
                    count,
                }),
                ZoneEffect::AutoSubmit => {
                    effects.extend(self.start_submission(&form_id, SubmitTrigger::AutoStage)?);
                }
            }
        }
        Ok(effects)
    }

    /// Validate and mark the form busy, then send its request on a
    /// background task. A form that is already submitting is left alone.
    fn start_submission(&mut self, form_id: &str, trigger: SubmitTrigger) -> Result<Option<Effect>> {
        let form = self
            .page
            .forms
            .iter_mut()
            .find(|f| f.id == form_id)
            .ok_or_else(|| PageError::UnknownForm(form_id.to_string()))?;

        if form.state() == SubmitState::Submitting {
            tracing::debug!(form = %form_id, ?trigger, "submission already in flight, ignoring");
            return Ok(None);
        }

        let Prepared { payload, ticket } = match self.pipeline.prepare(form, trigger) {
            Ok(prepared) => prepared,
            Err(report) => {
                return Ok(Some(Effect::Submitted {
                    form: form_id.to_string(),
                    outcome: SubmitOutcome::Invalid(report),
                }))
            }
        };

        let transport = self.pipeline.transport();
        let updates = self.updates_tx.clone();
        self.pending += 1;

        tokio::spawn(async move {
            // A panicking transport still has to settle the form.
            let result = match tokio::spawn(async move { transport.send(payload).await }).await {
                Ok(result) => result,
                Err(err) => Err(SubmitError::Transport(err.to_string())),
            };
            let _ = updates.send(Update::Settled { ticket, result });
        });

        Ok(Some(Effect::SubmissionStarted {
            form: form_id.to_string(),
        }))
    }

    /// Wait for the next piece of background work to land and apply it to
    /// the page. Returns `None` once nothing is pending.
    ///
    /// Cancel-safe: dropping the future before it resolves loses nothing,
    /// so it can sit in a `select!` next to the embedder's event source.
    pub async fn next_update(&mut self) -> Option<Effect> {
        while self.pending > 0 {
            // `self` holds a sender, so the channel never closes.
            let update = self.updates_rx.recv().await?;
            match update {
                Update::Frame { bar, frame } => {
                    if let Some(element) = self.page.elements.get_mut(bar) {
                        frame.apply(element);
                        return Some(Effect::Progress {
                            bar: element.id.clone(),
                            width: frame.width,
                        });
                    }
                }
                Update::FillDone => self.pending -= 1,
                Update::Settled { ticket, result } => {
                    self.pending -= 1;
                    if let Some(effect) = self.finish_submission(ticket, result) {
                        return Some(effect);
                    }
                }
            }
        }
        None
    }

    /// Drain background work until nothing is pending.
    pub async fn run_until_idle(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(effect) = self.next_update().await {
            effects.push(effect);
        }
        effects
    }

    fn finish_submission(
        &mut self,
        ticket: SubmitTicket,
        result: submission::Result<ServerResponse>,
    ) -> Option<Effect> {
        let form_id = ticket.form_id.clone();
        let Some(form) = self.page.forms.iter_mut().find(|f| f.id == form_id) else {
            tracing::warn!(form = %form_id, "submitted form is gone from the page");
            return None;
        };

        let outcome = self.pipeline.settle(form, ticket, result);
        if let SubmitOutcome::Succeeded { response, .. } = &outcome {
            route_response(&mut self.page, response);
        }
        Some(Effect::Submitted {
            form: form_id,
            outcome,
        })
    }

    // ------------------------------------------------------------------
    // Public helpers exposed to page scripts
    // ------------------------------------------------------------------

    pub fn show_alert(&self, severity: AlertSeverity, message: &str, ttl: Option<Duration>) -> String {
        self.alerts.show(severity, message, ttl)
    }

    /// Submit `form_id` without validation and wait for its outcome. Other
    /// background updates that land meanwhile are applied to the page.
    pub async fn submit_form(&mut self, form_id: &str) -> Result<SubmitOutcome> {
        match self.start_submission(form_id, SubmitTrigger::Programmatic)? {
            None => return Err(PageError::AlreadySubmitting(form_id.to_string())),
            Some(Effect::Submitted { outcome, .. }) => return Ok(outcome),
            Some(_) => {}
        }

        while let Some(effect) = self.next_update().await {
            if let Effect::Submitted { form, outcome } = effect {
                if form == form_id {
                    return Ok(outcome);
                }
            }
        }
        Err(PageError::SubmissionLost(form_id.to_string()))
    }

    pub fn update_job_fit_score(&mut self, score: f64) -> Result<FitTier> {
        let badge = self.page.mount(JOB_FIT_SCORE)?;
        Ok(render::update_job_fit_score(badge, score))
    }

    pub fn create_skill_tags<S: AsRef<str>>(
        &mut self,
        mount_id: &str,
        skills: &[S],
        category: &str,
    ) -> Result<()> {
        let container = self.page.mount(mount_id)?;
        render::create_skill_tags(container, skills, category);
        Ok(())
    }

    pub fn update_cover_letter_preview(&mut self, text: &str) -> Result<()> {
        let preview = self.page.mount(COVER_LETTER_PREVIEW)?;
        render::update_cover_letter_preview(preview, text);
        Ok(())
    }

    pub fn display_offer_analysis(&mut self, analysis: &OfferAnalysis) -> Result<()> {
        let container = self.page.mount(OFFER_ANALYSIS_CONTAINER)?;
        render::display_offer_analysis(container, analysis);
        Ok(())
    }
}
