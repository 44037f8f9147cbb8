//! Page controller tests: events in, effects and page state out.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::config::UiConfig;
use crate::core::alerts::AlertSeverity;
use crate::core::charts::{MockChartLibrary, APPLICATIONS_CHART};
use crate::core::dom::Element;
use crate::core::page::{App, Effect, Page, PageError, UiEvent, JOB_FIT_SCORE, MATCHING_SKILLS, MISSING_SKILLS};
use crate::core::render::FitTier;
use crate::core::staging::DropZoneEvent;
use crate::core::submission::Transport;
use crate::core::submission::{HistoryNavigator, SubmitOutcome, SubmitState};
use crate::core::ambient::IntersectionEntry;
use crate::tests::common::*;
use crate::tests::mocks::*;

fn app_with(transport: impl Transport + 'static, page: Page) -> (App, HistoryNavigator) {
    let navigator = HistoryNavigator::new();
    let app = App::new(
        UiConfig::default(),
        page,
        Arc::new(transport),
        Arc::new(navigator.clone()),
    );
    (app, navigator)
}

fn upload_page() -> Page {
    Page::new().with_form(upload_form()).with_drop_zone(upload_zone())
}

fn results_page() -> Page {
    Page::new()
        .with_form(match_form())
        .with_element(Element::new("div").with_id(JOB_FIT_SCORE).with_class("fit-score"))
        .with_element(Element::new("div").with_id(MATCHING_SKILLS))
        .with_element(Element::new("div").with_id(MISSING_SKILLS))
}

fn drop_zone(event: DropZoneEvent) -> UiEvent {
    UiEvent::DropZone {
        zone: UPLOAD_ZONE.to_string(),
        event,
    }
}

#[tokio::test]
async fn test_drop_stages_and_auto_submits() {
    let mut transport = MockTransport::new();
    transport.expect_send().times(1).returning(|_| {
        Ok(response(json!({"success": true, "message": "Resume uploaded successfully"})))
    });
    let (mut app, _) = app_with(transport, upload_page());

    let effects = app
        .dispatch(drop_zone(DropZoneEvent::Drop(vec![sample_pdf()])))
        .unwrap();

    assert_eq!(effects.len(), 3);
    assert!(matches!(effects[0], Effect::PreventDefault));
    assert!(matches!(effects[1], Effect::Staged { count: 1, .. }));
    assert!(matches!(&effects[2], Effect::SubmissionStarted { form } if form == UPLOAD_FORM));

    let settled = app.run_until_idle().await;
    assert!(matches!(
        settled.as_slice(),
        [Effect::Submitted { form, outcome }] if form == UPLOAD_FORM && outcome.is_success()
    ));

    let zone = app.page().drop_zone(UPLOAD_ZONE).unwrap();
    assert!(!zone.is_dragover());
    assert_eq!(zone.previews().len(), 1);
    assert_eq!(zone.previews()[0].name, "resume.pdf");

    let form = app.page().form(UPLOAD_FORM).unwrap();
    assert_eq!(form.field("resume").unwrap().files().names(), vec!["resume.pdf"]);

    let alerts = app.alerts().visible();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::Success);
    assert_eq!(alerts[0].message, "Resume uploaded successfully");
}

#[tokio::test]
async fn test_drag_highlight_and_click() {
    let mut transport = MockTransport::new();
    transport.expect_send().never();
    let (mut app, _) = app_with(transport, upload_page());

    let effects = app.dispatch(drop_zone(DropZoneEvent::DragOver)).unwrap();
    assert!(matches!(effects.as_slice(), [Effect::PreventDefault]));
    assert!(app.page().drop_zone(UPLOAD_ZONE).unwrap().is_dragover());

    app.dispatch(drop_zone(DropZoneEvent::DragLeave)).unwrap();
    assert!(!app.page().drop_zone(UPLOAD_ZONE).unwrap().is_dragover());

    let effects = app.dispatch(drop_zone(DropZoneEvent::Click)).unwrap();
    assert!(matches!(effects.as_slice(), [Effect::OpenFilePicker { zone }] if zone == UPLOAD_ZONE));
}

#[tokio::test]
async fn test_empty_picker_selection_is_ignored() {
    let mut transport = MockTransport::new();
    transport.expect_send().never();
    let (mut app, _) = app_with(transport, upload_page());

    let effects = app
        .dispatch(drop_zone(DropZoneEvent::PickerChange(Vec::new())))
        .unwrap();
    assert!(effects.is_empty());
    assert!(app.page().drop_zone(UPLOAD_ZONE).unwrap().previews().is_empty());
}

#[tokio::test]
async fn test_job_match_response_is_rendered() {
    let mut transport = MockTransport::new();
    transport.expect_send().times(1).returning(|_| {
        Ok(response(json!({
            "success": true,
            "fit_score": 64.5,
            "matching_skills": ["Python", "Django"],
            "missing_skills": ["AWS <cloud>"]
        })))
    });
    let (mut app, _) = app_with(transport, results_page());

    let effects = app
        .dispatch(UiEvent::Submit {
            form: MATCH_FORM.to_string(),
        })
        .unwrap();
    assert!(matches!(effects[0], Effect::PreventDefault));
    assert!(matches!(effects[1], Effect::SubmissionStarted { .. }));

    let settled = app.run_until_idle().await;
    assert!(matches!(&settled[0], Effect::Submitted { outcome, .. } if outcome.is_success()));

    let badge = app.page().element(JOB_FIT_SCORE).unwrap();
    assert_eq!(badge.inner_html, "64.5%");
    assert_eq!(badge.class_name(), "fit-score medium");

    let missing = &app.page().element(MISSING_SKILLS).unwrap().inner_html;
    assert_eq!(missing, r#"<span class="skill-tag missing">AWS &lt;cloud&gt;</span>"#);
}

#[tokio::test]
async fn test_input_then_invalid_submit() {
    let mut transport = MockTransport::new();
    transport.expect_send().never();
    let (mut app, _) = app_with(transport, Page::new().with_form(contact_form()));

    app.dispatch(UiEvent::Input {
        form: CONTACT_FORM.to_string(),
        field: "email".to_string(),
        value: "asha@".to_string(),
    })
    .unwrap();

    let effects = app
        .dispatch(UiEvent::Submit {
            form: CONTACT_FORM.to_string(),
        })
        .unwrap();
    assert!(matches!(
        &effects[1],
        Effect::Submitted { outcome: SubmitOutcome::Invalid(_), .. }
    ));
    assert_eq!(app.pending(), 0);

    let email = app.page().form(CONTACT_FORM).unwrap().field("email").unwrap();
    assert_eq!(email.value(), "asha@");
    assert_eq!(
        email.error().map(|e| e.message.as_str()),
        Some("Please enter a valid email address")
    );
    assert!(app.alerts().is_empty());
}

#[tokio::test]
async fn test_unknown_targets_are_errors() {
    let (mut app, _) = app_with(MockTransport::new(), Page::new().with_form(contact_form()));

    let err = app
        .dispatch(UiEvent::Submit {
            form: "missing".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, PageError::UnknownForm(ref id) if id == "missing"));

    let err = app
        .dispatch(UiEvent::Input {
            form: CONTACT_FORM.to_string(),
            field: "phone".to_string(),
            value: "555".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, PageError::UnknownField { .. }));

    let err = app.dispatch(drop_zone(DropZoneEvent::Click)).unwrap_err();
    assert!(matches!(err, PageError::UnknownDropZone(_)));

    assert!(matches!(
        app.update_job_fit_score(90.0),
        Err(PageError::UnknownMount(_))
    ));
}

#[tokio::test]
async fn test_facade_helpers() {
    let (mut app, _) = app_with(MockTransport::new(), results_page());

    assert_eq!(app.update_job_fit_score(85.0).unwrap(), FitTier::High);
    app.create_skill_tags(MATCHING_SKILLS, &["Rust"], "").unwrap();
    assert_eq!(
        app.page().element(MATCHING_SKILLS).unwrap().inner_html,
        r#"<span class="skill-tag default">Rust</span>"#
    );

    let id = app.show_alert(AlertSeverity::Info, "Saved draft", None);
    assert_eq!(app.alerts().visible().len(), 1);
    app.dispatch(UiEvent::DismissAlert(id)).unwrap();
    assert!(app.alerts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_load_wires_the_page() {
    let page = Page::new()
        .with_element(
            Element::new("button")
                .with_id("upload-help")
                .with_data("bs-toggle", "tooltip")
                .with_attribute("title", "PDF or DOCX, up to 10 MB"),
        )
        .with_element(Element::new("section").with_id("features").with_class("animate-on-scroll"))
        .with_element(
            Element::new("div")
                .with_id("profile-progress")
                .with_class("progress-bar")
                .with_data("progress", "75"),
        )
        .with_element(Element::new("canvas").with_id(APPLICATIONS_CHART));

    let mut charts = MockChartLibrary::new();
    charts
        .expect_create()
        .withf(|mount, _| mount == APPLICATIONS_CHART)
        .times(1)
        .return_const(());

    let (app, _) = app_with(MockTransport::new(), page);
    let mut app = app.with_chart_library(Arc::new(charts));

    let report = app.load();
    assert_eq!(report.tooltips.len(), 1);
    assert_eq!(report.tooltips[0].title, "PDF or DOCX, up to 10 MB");
    assert_eq!(report.observed, 1);
    assert_eq!(report.charts, vec![APPLICATIONS_CHART]);
    assert_eq!(report.progress_bars, 1);

    // The fill runs in the background; the page keeps taking events.
    assert_eq!(app.pending(), 1);
    assert!(app.page().element("profile-progress").unwrap().style("width").is_none());

    let effects = app
        .dispatch(UiEvent::Intersection(vec![IntersectionEntry {
            target: "features".to_string(),
            intersection_ratio: 0.4,
        }]))
        .unwrap();
    assert!(matches!(effects.as_slice(), [Effect::FadedIn(1)]));
    assert!(app.page().element("features").unwrap().has_class("fade-in"));

    // Already faded in; a second report changes nothing.
    let effects = app
        .dispatch(UiEvent::Intersection(vec![IntersectionEntry {
            target: "features".to_string(),
            intersection_ratio: 1.0,
        }]))
        .unwrap();
    assert!(matches!(effects.as_slice(), [Effect::FadedIn(0)]));

    let started = tokio::time::Instant::now();
    let frames = app.run_until_idle().await;
    assert_eq!(frames.len(), 50);
    assert!(matches!(
        frames.last(),
        Some(Effect::Progress { bar: Some(id), width }) if id == "profile-progress" && *width == 75.0
    ));
    assert_eq!(started.elapsed(), Duration::from_millis(50 * 20));

    let bar = app.page().element("profile-progress").unwrap();
    assert_eq!(bar.style("width"), Some("75%"));
    assert_eq!(bar.inner_html, "75%");
    assert_eq!(app.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_alerts_expire_after_ttl() {
    let (app, _) = app_with(MockTransport::new(), Page::new());
    app.show_alert(AlertSeverity::Warning, "Session expiring", None);

    tokio::time::sleep(Duration::from_millis(4999)).await;
    assert_eq!(app.alerts().visible().len(), 1);
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(app.alerts().is_empty());
}

#[tokio::test]
async fn test_busy_control_is_visible_while_in_flight() {
    let transport = GatedTransport::new(response(json!({"success": true, "message": "Sent"})));
    let page = upload_page().with_form(contact_form());
    let (mut app, _) = app_with(transport.clone(), page);
    for (field, value) in [("name", "Asha"), ("email", "asha@example.com")] {
        app.dispatch(UiEvent::Input {
            form: CONTACT_FORM.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
        .unwrap();
    }

    let effects = app
        .dispatch(UiEvent::Submit {
            form: CONTACT_FORM.to_string(),
        })
        .unwrap();
    assert!(matches!(effects.as_slice(), [Effect::PreventDefault, Effect::SubmissionStarted { .. }]));

    let form = app.page().form(CONTACT_FORM).unwrap();
    let button = form.submit_button.as_ref().unwrap();
    assert!(button.disabled);
    assert_eq!(button.label, UiConfig::default().submission.busy_label);
    assert_eq!(form.state(), SubmitState::Submitting);

    // Other events are handled while the request is out.
    let effects = app.dispatch(drop_zone(DropZoneEvent::DragOver)).unwrap();
    assert!(matches!(effects.as_slice(), [Effect::PreventDefault]));
    assert!(app.page().drop_zone(UPLOAD_ZONE).unwrap().is_dragover());
    let id = app.show_alert(AlertSeverity::Info, "Draft saved", None);
    app.dispatch(UiEvent::DismissAlert(id)).unwrap();
    assert!(app.alerts().is_empty());

    // A second submit of the same form is ignored.
    let effects = app
        .dispatch(UiEvent::Submit {
            form: CONTACT_FORM.to_string(),
        })
        .unwrap();
    assert!(matches!(effects.as_slice(), [Effect::PreventDefault]));
    assert_eq!(app.pending(), 1);

    transport.release();

    let settled = app.run_until_idle().await;
    assert!(matches!(
        settled.as_slice(),
        [Effect::Submitted { form, outcome }] if form == CONTACT_FORM && outcome.is_success()
    ));

    assert_eq!(transport.sent(), 1);
    let form = app.page().form(CONTACT_FORM).unwrap();
    let button = form.submit_button.as_ref().unwrap();
    assert!(!button.disabled);
    assert_eq!(button.label, "Send");
    assert_eq!(form.state(), SubmitState::Idle);
    assert_eq!(app.alerts().visible()[0].message, "Sent");
}

#[tokio::test]
async fn test_submit_form_waits_for_its_outcome() {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(|_| Ok(response(json!({"success": true, "fit_score": 91}))));
    let (mut app, _) = app_with(transport, results_page());

    let outcome = app.submit_form(MATCH_FORM).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(app.page().element(JOB_FIT_SCORE).unwrap().inner_html, "91%");
    assert_eq!(app.pending(), 0);
}

#[tokio::test]
async fn test_submit_form_refuses_a_busy_form() {
    let transport = GatedTransport::new(response(json!({"success": true})));
    let (mut app, _) = app_with(transport.clone(), results_page());

    app.dispatch(UiEvent::Submit {
        form: MATCH_FORM.to_string(),
    })
    .unwrap();
    let err = app.submit_form(MATCH_FORM).await.unwrap_err();
    assert!(matches!(err, PageError::AlreadySubmitting(ref id) if id == MATCH_FORM));

    transport.release();
    assert_eq!(app.run_until_idle().await.len(), 1);
}
