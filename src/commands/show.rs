//! Show command - displays information.

use anyhow::Result;

use crate::config::Config;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config { json: bool },
}

/// Execute the show command.
pub fn cmd_show(target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Config { json: true } => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ShowTarget::Config { json: false } => config.print(),
    }
    Ok(())
}
