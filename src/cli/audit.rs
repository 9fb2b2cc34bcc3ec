//! Audit log CLI command

use super::AppContext;
use crate::error::HearthResult;

/// Print the most recent audit entries, oldest first
pub fn handle_audit_command(ctx: &AppContext, limit: usize) -> HearthResult<()> {
    let entries = ctx.audit.read_recent(limit)?;
    if entries.is_empty() {
        println!("No audit entries yet.");
        return Ok(());
    }

    for entry in entries {
        println!("{}", entry);
    }
    Ok(())
}
