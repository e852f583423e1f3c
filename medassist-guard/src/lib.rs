//! # medassist-guard
//!
//! The guard layer protecting the language-model call in both directions:
//! input sanitisation, prompt-injection screening and crisis short-circuit
//! before retrieval, and policy screening of generated answers before they
//! are returned. Also owns the fixed response texts (medical disclaimer,
//! crisis resources, generic refusal).
//!
//! Rules live in a versioned, ordered [`RuleSet`]; every rule has a stable
//! name so behaviour is auditable and individually testable.

pub mod guard;
pub mod messages;
pub mod rules;
pub mod sanitize;

pub use guard::{Guard, PostCheckOutcome, PreCheckOutcome};
pub use messages::{CRISIS_RESPONSE, DISCLAIMER, REFUSAL};
pub use rules::{GuardRule, RuleAction, RuleCategory, RuleSet};
pub use sanitize::sanitize;
