//! Placement Partner UI
//!
//! Headless front-end layer for the Placement Partner web app: drag-and-drop
//! upload staging, form validation, AJAX submission with alert feedback, and
//! the small renderers that paint job-fit and offer-analysis results.

pub mod config;
pub mod core;


pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
