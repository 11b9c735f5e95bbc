//! Preflight checks for the maintainer tools.
//!
//! Reports whether each enabled step's program can be found. Purely
//! informational: `run` never consults it.

use crate::hook::{HookStep, PostInstallHook};
use crate::process;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Tool found.
    Pass,
    /// Tool not found. The step will be a no-op.
    Warn,
    /// Step disabled or the install is staged.
    Skip,
}

impl CheckResult {
    pub fn pass_with(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: Some(details.to_string()),
        }
    }

    pub fn warn(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warn,
            details: Some(details.to_string()),
        }
    }

    pub fn skip(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Skip,
            details: Some(details.to_string()),
        }
    }
}

/// Package hint for each default tool.
fn package_hint(step: HookStep) -> &'static str {
    match step {
        HookStep::CompileSchemas => "glib2 (libglib2.0-bin on Debian)",
        HookStep::UpdateIconCache => "gtk3 or gtk-update-icon-cache",
        HookStep::UpdateDesktopDatabase => "desktop-file-utils",
    }
}

/// Check every step's tool.
pub fn run_preflight(hook: &PostInstallHook) -> PreflightReport {
    let config = hook.config();
    let steps = hook.steps();
    let mut checks = Vec::new();

    for step in HookStep::ALL {
        let program = step.program(&config.tools);
        let name = format!("{} ({})", step, program.to_string_lossy());

        if !steps.is_enabled(step) {
            checks.push(CheckResult::skip(&name, "step disabled"));
            continue;
        }
        if config.is_staged() {
            checks.push(CheckResult::skip(&name, "staging root set"));
            continue;
        }

        let check = match process::which(program) {
            Some(path) => CheckResult::pass_with(&name, &path),
            None => CheckResult::warn(
                &name,
                &format!("Not found. Install '{}'.", package_hint(step)),
            ),
        };
        checks.push(check);
    }

    PreflightReport { checks }
}

/// Results of all preflight checks.
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if no enabled tool is missing.
    pub fn all_found(&self) -> bool {
        self.missing_count() == 0
    }

    pub fn missing_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Warn)
            .count()
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let status_str = match check.status {
                CheckStatus::Pass => "PASS",
                CheckStatus::Warn => "WARN",
                CheckStatus::Skip => "SKIP",
            };

            print!("  [{}] {}", status_str, check.name);
            if let Some(details) = &check.details {
                println!(": {}", details);
            } else {
                println!();
            }
        }

        println!();
        let missing = self.missing_count();
        if missing > 0 {
            println!("{} tool(s) missing; those steps will do nothing.", missing);
        } else {
            println!("All enabled tools found.");
        }
    }
}
