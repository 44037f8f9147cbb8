//! Page-load Wiring
//!
//! Tooltips, fade-in-on-scroll and progress-bar fill. All three run on
//! their own once the page is up and never touch the submission pipeline.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::dom::Element;

pub const ANIMATE_ON_SCROLL: &str = "animate-on-scroll";
pub const FADE_IN: &str = "fade-in";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub progress_steps: u32,
    pub progress_cadence_ms: u64,
    /// Visible fraction at which a scroll-animated element fades in
    pub scroll_threshold: f64,
    /// Bottom root margin in pixels; negative shrinks the viewport
    pub root_margin_bottom_px: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            progress_steps: 50,
            progress_cadence_ms: 20,
            scroll_threshold: 0.1,
            root_margin_bottom_px: -50.0,
        }
    }
}

impl AnimationConfig {
    pub fn progress_cadence(&self) -> Duration {
        Duration::from_millis(self.progress_cadence_ms)
    }
}

// ============================================================================
// Tooltips
// ============================================================================

/// An activated tooltip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub target: Option<String>,
    pub title: String,
}

/// Activate every `data-bs-toggle="tooltip"` element.
pub fn activate_tooltips<'a>(elements: impl IntoIterator<Item = &'a mut Element>) -> Vec<Tooltip> {
    let mut tooltips = Vec::new();
    for el in elements {
        if el.data("bs-toggle") != Some("tooltip") {
            continue;
        }
        let title = el
            .data("bs-title")
            .or_else(|| el.attribute("title"))
            .unwrap_or_default()
            .to_string();
        el.set_data("tooltip-active", "true");
        tooltips.push(Tooltip {
            target: el.id.clone(),
            title,
        });
    }
    tracing::debug!(count = tooltips.len(), "tooltips activated");
    tooltips
}

// ============================================================================
// Scroll animation
// ============================================================================

/// Vertical extent of an element relative to the viewport top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

/// Visibility report for one observed element
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: String,
    pub intersection_ratio: f64,
}

/// Fades in `.animate-on-scroll` elements once enough of them is visible.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    threshold: f64,
    root_margin_bottom: f64,
    observed: HashSet<String>,
}

impl ScrollAnimator {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            threshold: config.scroll_threshold,
            root_margin_bottom: config.root_margin_bottom_px,
            observed: HashSet::new(),
        }
    }

    /// Start observing every scroll-animated element that has an id.
    pub fn observe<'a>(&mut self, elements: impl IntoIterator<Item = &'a Element>) -> usize {
        for el in elements {
            if !el.has_class(ANIMATE_ON_SCROLL) {
                continue;
            }
            match &el.id {
                Some(id) => {
                    self.observed.insert(id.clone());
                }
                None => tracing::warn!("scroll-animated element without id is not observed"),
            }
        }
        self.observed.len()
    }

    pub fn is_observing(&self, id: &str) -> bool {
        self.observed.contains(id)
    }

    /// Fraction of `rect` inside a viewport of `viewport_height`, after the
    /// bottom root margin is applied.
    pub fn intersection_ratio(&self, rect: Rect, viewport_height: f64) -> f64 {
        if rect.height <= 0.0 {
            return 0.0;
        }
        let bottom_edge = (viewport_height + self.root_margin_bottom).max(0.0);
        let visible_top = rect.top.max(0.0);
        let visible_bottom = (rect.top + rect.height).min(bottom_edge);
        ((visible_bottom - visible_top) / rect.height).clamp(0.0, 1.0)
    }

    /// Apply intersection reports. Elements that cross the threshold get the
    /// `fade-in` class and stop being observed; it is never taken away.
    /// Returns how many elements faded in.
    pub fn handle(&mut self, entries: &[IntersectionEntry], elements: &mut [Element]) -> usize {
        let mut faded = 0;
        for entry in entries {
            if entry.intersection_ratio <= 0.0 || entry.intersection_ratio < self.threshold {
                continue;
            }
            if !self.observed.remove(&entry.target) {
                continue;
            }
            if let Some(el) = elements.iter_mut().find(|el| el.has_id(&entry.target)) {
                el.add_class(FADE_IN);
                faded += 1;
            }
        }
        faded
    }
}

// ============================================================================
// Progress bars
// ============================================================================

/// One step of a progress-bar fill
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressFrame {
    pub width: f64,
    pub label: String,
}

impl ProgressFrame {
    fn at(width: f64) -> Self {
        Self {
            width,
            label: format!("{}%", width.round()),
        }
    }

    pub fn apply(&self, bar: &mut Element) {
        bar.set_style("width", format!("{}%", self.width));
        bar.set_text(&self.label);
    }
}

/// Linear fill from 0 to `target` in `steps` frames; the last frame is
/// exactly `target`.
#[derive(Debug, Clone)]
pub struct ProgressAnimation {
    target: f64,
    steps: u32,
    next: u32,
}

impl ProgressAnimation {
    pub fn new(target: f64, steps: u32) -> Self {
        // A zero target settles on the first tick.
        let steps = if target == 0.0 { 1 } else { steps.max(1) };
        Self {
            target,
            steps,
            next: 1,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Iterator for ProgressAnimation {
    type Item = ProgressFrame;

    fn next(&mut self) -> Option<ProgressFrame> {
        if self.next > self.steps {
            return None;
        }
        let width = if self.next == self.steps {
            self.target
        } else {
            self.target * f64::from(self.next) / f64::from(self.steps)
        };
        self.next += 1;
        Some(ProgressFrame::at(width))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.steps + 1).saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

/// Read a bar's `data-progress` target.
pub fn progress_target(bar: &Element) -> Option<f64> {
    bar.data("progress")
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Play `animation` one frame per cadence tick, handing each frame to
/// `on_frame`. Stops early once `on_frame` returns `false`.
pub async fn play_frames<F>(animation: ProgressAnimation, cadence: Duration, mut on_frame: F)
where
    F: FnMut(ProgressFrame) -> bool,
{
    let mut interval = tokio::time::interval(cadence);
    // The first tick of a tokio interval completes immediately.
    interval.tick().await;
    for frame in animation {
        interval.tick().await;
        if !on_frame(frame) {
            break;
        }
    }
}

pub fn is_progress_bar(element: &Element) -> bool {
    element.has_class("progress-bar") && element.data("progress").is_some()
}

/// Index and target of every `.progress-bar[data-progress]` in `elements`.
/// Bars whose target does not parse are skipped.
pub fn find_progress_bars(elements: &[Element]) -> Vec<(usize, f64)> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, el)| is_progress_bar(el))
        .filter_map(|(index, bar)| match progress_target(bar) {
            Some(target) => Some((index, target)),
            None => {
                tracing::warn!(bar = ?bar.id, "ignoring progress bar with unreadable target");
                None
            }
        })
        .collect()
}
