//! Plan command - print what `run` would execute.

use anyhow::Result;

use crate::hook::PostInstallHook;

/// Execute the plan command.
pub fn cmd_plan(hook: &PostInstallHook, json: bool) -> Result<()> {
    let invocations = hook.plan()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&invocations)?);
        return Ok(());
    }

    if let Some(destdir) = &hook.config().destdir {
        println!("Staging root {} set, nothing to run.", destdir.display());
        return Ok(());
    }
    for invocation in &invocations {
        println!("{}", invocation);
    }
    Ok(())
}
