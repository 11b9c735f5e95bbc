//! Preflight command - runs preflight checks.

use anyhow::{bail, Result};

use crate::hook::PostInstallHook;
use crate::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(hook: &PostInstallHook, strict: bool) -> Result<()> {
    let report = preflight::run_preflight(hook);
    report.print();

    if strict && !report.all_found() {
        bail!(
            "Preflight failed: {} tool(s) not found.",
            report.missing_count()
        );
    }
    Ok(())
}
