//! Run command - refresh the desktop caches.

use anyhow::Result;

use crate::hook::{PostInstallHook, SystemRunner};

/// Execute the run command.
///
/// Step failures are reported (with `verbose`) but never returned as errors.
pub fn cmd_run(hook: &PostInstallHook, verbose: bool) -> Result<()> {
    let report = hook.run(&mut SystemRunner)?;

    if verbose {
        report.print();
        let failed = report.failed_count();
        if failed > 0 {
            eprintln!("{} step(s) did not succeed; caches may be stale.", failed);
        }
    }

    Ok(())
}
