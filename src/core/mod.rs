//! Core UI behaviour: element model, forms, staging, submission, rendering
//! and the page controller that ties them together.

pub mod dom;
pub mod format;
pub mod form;
pub(crate) mod lenient;
pub mod logging;
pub mod validation;
pub mod staging;
pub mod alerts;
pub mod submission;
pub mod render;
pub mod ambient;
pub mod charts;
pub mod timing;
pub mod page;

pub use alerts::{AlertCenter, AlertSeverity};
pub use form::{Field, FieldKind, Form};
pub use page::{App, Effect, Page, PageError, UiEvent};
pub use submission::{SubmissionPipeline, SubmitOutcome, SubmitTrigger};
