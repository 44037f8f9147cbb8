//! Result Renderers
//!
//! Paint analysis results into mount points. Every renderer replaces the
//! mount's whole content; nothing is diffed.

use serde::{Deserialize, Serialize};

use super::dom::Element;
use super::format::{escape_html, text_to_html_lines};
use super::lenient;

pub const NOT_SPECIFIED: &str = "Not specified";
pub const NO_RISKS: &str = "No significant risks identified";
pub const ANALYSIS_DONE: &str = "Analysis completed successfully.";

// ============================================================================
// Job fit score
// ============================================================================

/// Score bands for the fit badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitTier {
    High,
    Medium,
    Low,
}

impl FitTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            FitTier::High
        } else if score >= 60.0 {
            FitTier::Medium
        } else {
            FitTier::Low
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            FitTier::High => "high",
            FitTier::Medium => "medium",
            FitTier::Low => "low",
        }
    }
}

/// Paint the `fit-score` badge: `"<score>%"` plus the tier class.
pub fn update_job_fit_score(badge: &mut Element, score: f64) -> FitTier {
    let tier = FitTier::from_score(score);
    badge.set_text(&format!("{}%", score));
    badge.set_class_name("fit-score");
    badge.add_class(tier.css_class());
    tier
}

// ============================================================================
// Skill tags
// ============================================================================

/// Render `skills` as `skill-tag` spans tagged with `category`.
pub fn create_skill_tags<S: AsRef<str>>(container: &mut Element, skills: &[S], category: &str) {
    let category = if category.trim().is_empty() { "default" } else { category };
    let html: String = skills
        .iter()
        .map(|skill| {
            format!(
                r#"<span class="skill-tag {}">{}</span>"#,
                escape_html(category),
                escape_html(skill.as_ref())
            )
        })
        .collect();
    container.set_inner_html(html);
}

// ============================================================================
// Cover letter
// ============================================================================

pub fn update_cover_letter_preview(preview: &mut Element, text: &str) {
    preview.set_inner_html(text_to_html_lines(text));
    preview.scroll_top = 0;
}

// ============================================================================
// Offer analysis
// ============================================================================

/// Offer-letter analysis as produced by the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferAnalysis {
    #[serde(default, deserialize_with = "lenient::text")]
    pub ctc: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub probation_period: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notice_period: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub risk_flags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub negotiation_points: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub questions_to_ask: Option<Vec<String>>,
}

impl OfferAnalysis {
    /// Pull an analysis out of a response payload, if it carries one.
    pub fn from_payload(payload: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        const KEYS: [&str; 5] = ["ctc", "probation_period", "notice_period", "risk_flags", "explanation"];
        if !KEYS.iter().any(|k| payload.contains_key(*k)) {
            return None;
        }
        match serde_json::from_value(serde_json::Value::Object(payload.clone())) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable offer analysis payload");
                None
            }
        }
    }
}

fn key_info_row(label: &str, value: Option<&str>) -> String {
    format!(
        "<li><strong>{}:</strong> {}</li>",
        label,
        escape_html(value.unwrap_or(NOT_SPECIFIED))
    )
}

fn optional_list_section(title: &str, items: Option<&Vec<String>>) -> String {
    match items {
        Some(items) if !items.is_empty() => {
            let rows: String = items
                .iter()
                .map(|item| format!("<li>{}</li>", escape_html(item)))
                .collect();
            format!(r#"<div class="mt-4"><h5>{}</h5><ul>{}</ul></div>"#, title, rows)
        }
        _ => String::new(),
    }
}

pub fn display_offer_analysis(container: &mut Element, analysis: &OfferAnalysis) {
    // A present-but-empty flag list renders nothing, only a missing one
    // gets the reassurance line.
    let risk_flags = match &analysis.risk_flags {
        Some(flags) => flags
            .iter()
            .map(|flag| {
                format!(
                    r#"<div class="risk-flag"><i class="fas fa-exclamation-triangle me-2"></i>{}</div>"#,
                    escape_html(flag)
                )
            })
            .collect::<String>(),
        None => format!(r#"<p class="text-muted">{}</p>"#, NO_RISKS),
    };

    let html = format!(
        concat!(
            r#"<div class="offer-analysis">"#,
            r#"<h4 class="mb-3">Analysis Results</h4>"#,
            r#"<div class="row">"#,
            r#"<div class="col-md-6"><h5>Key Information</h5><ul class="list-unstyled">{}{}{}</ul></div>"#,
            r#"<div class="col-md-6"><h5>Risk Assessment</h5><div id="risk-flags">{}</div></div>"#,
            "</div>",
            r#"<div class="mt-4"><h5>Summary</h5><p>{}</p></div>"#,
            "{}{}",
            "</div>"
        ),
        key_info_row("CTC", analysis.ctc.as_deref()),
        key_info_row("Probation Period", analysis.probation_period.as_deref()),
        key_info_row("Notice Period", analysis.notice_period.as_deref()),
        risk_flags,
        escape_html(analysis.explanation.as_deref().unwrap_or(ANALYSIS_DONE)),
        optional_list_section("Negotiation Points", analysis.negotiation_points.as_ref()),
        optional_list_section("Questions to Ask", analysis.questions_to_ask.as_ref()),
    );

    container.set_inner_html(html);
}

// ============================================================================
// Job matching report
// ============================================================================

/// Job-matching result: fit score plus matched and missing skills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFitReport {
    #[serde(deserialize_with = "lenient::number")]
    pub fit_score: f64,
    #[serde(default, deserialize_with = "lenient::text_vec")]
    pub matching_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_vec")]
    pub missing_skills: Vec<String>,
}

impl JobFitReport {
    pub fn from_payload(payload: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        if !payload.contains_key("fit_score") {
            return None;
        }
        match serde_json::from_value(serde_json::Value::Object(payload.clone())) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable job fit payload");
                None
            }
        }
    }
}
