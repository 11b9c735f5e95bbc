//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `run` - Run the hook (default)
//! - `plan` - Print the commands the hook would run
//! - `preflight` - Check the maintainer tools are installed
//! - `show` - Display information

mod plan;
mod preflight;
mod run;
pub mod show;

pub use plan::cmd_plan;
pub use preflight::cmd_preflight;
pub use run::cmd_run;
pub use show::cmd_show;
