//! Property-based tests
//!
//! Invariants checked with proptest across generated inputs:
//!
//! - `email_props`: the email check agrees with a hand-written reading of
//!   "one `@`-free local part, `@`, a domain with a dot, no whitespace"
//! - `progress_props`: progress fills never overshoot, never go backwards
//!   and always end exactly on the target
//! - `format_props`: size labels pick the right unit and never carry
//!   trailing zeros
//!
//! By default proptest runs 256 cases per property; set `PROPTEST_CASES`
//! to change that.

mod progress_props;
