//! Test Fixtures
//!
//! Forms and files shaped like the ones on the real pages.

#![allow(dead_code)]

use crate::core::form::{Field, Form};
use crate::core::staging::{DropZone, FileHandle};
use crate::core::submission::ServerResponse;

pub const UPLOAD_FORM: &str = "resume-upload-form";
pub const UPLOAD_ZONE: &str = "resume-drop-zone";
pub const CONTACT_FORM: &str = "contact-form";
pub const MATCH_FORM: &str = "job-match-form";

/// A validated form with a required name and a required email.
pub fn contact_form() -> Form {
    Form::new(CONTACT_FORM, "/contact/")
        .validated()
        .with_submit_button("Send")
        .with_field(Field::text("name").required())
        .with_field(Field::email("email").required())
        .with_field(Field::text("message"))
}

/// The resume upload form: one required file input, submits on staging.
pub fn upload_form() -> Form {
    Form::new(UPLOAD_FORM, "/upload_resume/")
        .validated()
        .auto_submitting()
        .with_submit_button("Upload Resume")
        .with_field(Field::file("resume").required())
}

pub fn upload_zone() -> DropZone {
    DropZone::new(UPLOAD_ZONE, UPLOAD_FORM, "resume")
}

/// Job matching: pick a resume and a job description by id.
pub fn match_form() -> Form {
    Form::new(MATCH_FORM, "/job_matching/")
        .validated()
        .with_submit_button("Analyze Match")
        .with_field(Field::text("resume_id").required().with_value("3"))
        .with_field(Field::text("job_description_id").required().with_value("7"))
}

pub fn sample_pdf() -> FileHandle {
    FileHandle::new("resume.pdf", &b"%PDF-1.4 sample resume"[..]).with_content_type("application/pdf")
}

pub fn response(value: serde_json::Value) -> ServerResponse {
    serde_json::from_value(value).expect("fixture response decodes")
}
