//! Cross-cutting types shared by every crate in the booking engine:
//! locale handling, money helpers, PII redaction and analytics payloads.

pub mod locale;
pub mod models;
pub mod money;
pub mod pii;
