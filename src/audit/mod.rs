//! Audit trail for Hearth
//!
//! Every mutation made through the services is appended to a JSONL file as
//! an [`AuditEntry`] carrying the entity's state before and after the change.
//! The log is append-only; nothing in the crate rewrites or truncates it.

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
