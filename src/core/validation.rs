//! Form Validation Module
//!
//! Checks `required` and `email` constraints on every field of a form and
//! keeps one inline error per failing field. All fields are checked; the
//! first failure does not stop the pass.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::form::{Field, FieldKind, Form};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("This field is required")]
    MissingValue,

    #[error("Please enter a valid email address")]
    InvalidFormat,
}

pub type Result<T> = std::result::Result<T, ValidationError>;

// Deliberately loose: something@something.something, no whitespace.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

// ============================================================================
// Validation Report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: String,
    pub error: ValidationError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub failures: Vec<FieldFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn error_for(&self, field: &str) -> Option<&ValidationError> {
        self.failures
            .iter()
            .find(|f| f.field == field)
            .map(|f| &f.error)
    }
}

// ============================================================================
// Validator
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FormValidator;

impl FormValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check a single field without touching its annotation.
    pub fn check_field(&self, field: &Field) -> Result<()> {
        if field.required && field.is_blank() {
            return Err(ValidationError::MissingValue);
        }

        // Empty optional emails are fine; the raw value is matched, untrimmed.
        if field.kind == FieldKind::Email
            && !field.value().is_empty()
            && !is_valid_email(field.value())
        {
            return Err(ValidationError::InvalidFormat);
        }

        Ok(())
    }

    /// Validate every field, annotating failures and clearing passes.
    pub fn validate(&self, form: &mut Form) -> ValidationReport {
        let mut report = ValidationReport::default();

        for field in form.fields_mut() {
            match self.check_field(field) {
                Ok(()) => field.clear_error(),
                Err(error) => {
                    field.show_error(error.clone());
                    report.failures.push(FieldFailure {
                        field: field.name.clone(),
                        error,
                    });
                }
            }
        }

        if !report.is_valid() {
            tracing::debug!(
                form = %form.id,
                failures = report.failures.len(),
                "form failed validation"
            );
        }

        report
    }
}
