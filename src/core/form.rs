//! Form Model
//!
//! Forms, their fields and the submit control. Per-field error annotations
//! and the staged file set both live on the owning field.

use serde::{Deserialize, Serialize};

use super::staging::StagedFiles;
use super::submission::SubmitState;
use super::validation::ValidationError;

// ============================================================================
// Fields
// ============================================================================

/// Input type of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Select,
    Textarea,
    File,
    Hidden,
}

/// Inline error attached to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub kind: ValidationError,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ValidationError) -> Self {
        let message = kind.to_string();
        Self { kind, message }
    }

    /// Feedback block appended next to the field.
    pub fn render_html(&self) -> String {
        format!(
            r#"<div class="invalid-feedback d-block">{}</div>"#,
            super::format::escape_html(&self.message)
        )
    }
}

/// A single named form control
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    value: String,
    files: StagedFiles,
    error: Option<FieldError>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            value: String::new(),
            files: StagedFiles::default(),
            error: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn email(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::File)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn files(&self) -> &StagedFiles {
        &self.files
    }

    /// Replace the field's file list wholesale.
    pub fn set_files(&mut self, files: StagedFiles) {
        self.files = files;
    }

    /// True when a required check would fail.
    pub fn is_blank(&self) -> bool {
        match self.kind {
            FieldKind::File => self.files.is_empty(),
            _ => self.value.trim().is_empty(),
        }
    }

    pub fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }

    /// The `is-invalid` flag.
    pub fn is_invalid(&self) -> bool {
        self.error.is_some()
    }

    /// Attach an error, replacing any previous one.
    pub fn show_error(&mut self, kind: ValidationError) {
        self.error = Some(FieldError::new(kind));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

// ============================================================================
// Submit control
// ============================================================================

/// The form's `button[type=submit]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: String,
    pub disabled: bool,
}

impl SubmitButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }
}

// ============================================================================
// Form
// ============================================================================

#[derive(Debug, Clone)]
pub struct Form {
    pub id: String,
    /// Declared destination (`action`)
    pub action: String,
    /// Declared method; `POST` when absent
    pub method: Option<String>,
    /// `data-validate="true"`
    pub validate: bool,
    /// `data-auto-submit="true"`
    pub auto_submit: bool,
    pub submit_button: Option<SubmitButton>,
    fields: Vec<Field>,
    state: SubmitState,
}

impl Form {
    pub fn new(id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            method: None,
            validate: false,
            auto_submit: false,
            submit_button: None,
            fields: Vec::new(),
            state: SubmitState::Idle,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn validated(mut self) -> Self {
        self.validate = true;
        self
    }

    pub fn auto_submitting(mut self) -> Self {
        self.auto_submit = true;
        self
    }

    pub fn with_submit_button(mut self, label: impl Into<String>) -> Self {
        self.submit_button = Some(SubmitButton::new(label));
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Effective request method, upper-cased.
    pub fn method(&self) -> String {
        self.method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("POST")
            .to_ascii_uppercase()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SubmitState) {
        tracing::debug!(form = %self.id, from = ?self.state, to = ?state, "submit state");
        self.state = state;
    }
}
