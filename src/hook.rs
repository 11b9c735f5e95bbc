//! The post-install hook.
//!
//! Refreshes desktop caches after files are installed under a prefix:
//!
//! 1. GSettings schema cache (`share/glib-2.0/schemas`)
//! 2. hicolor icon theme cache (`share/icons/hicolor`)
//! 3. desktop-entry / MIME database
//!
//! Every step is best effort. A missing or failing tool is recorded in the
//! report and the remaining steps still run. Nothing runs when a staging
//! root is set; the caches get refreshed later on the real system.

use serde::Serialize;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::{lossy, Config, Tools};
use crate::process::{Cmd, StepOutcome};

/// Schema directory, relative to the install prefix.
pub const SCHEMA_DIR: &str = "share/glib-2.0/schemas";
/// Icon theme directory, relative to the install prefix.
pub const ICON_THEME_DIR: &str = "share/icons/hicolor";

/// A single cache-refresh step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookStep {
    CompileSchemas,
    UpdateIconCache,
    UpdateDesktopDatabase,
}

impl HookStep {
    /// All steps, in execution order.
    pub const ALL: [HookStep; 3] = [
        HookStep::CompileSchemas,
        HookStep::UpdateIconCache,
        HookStep::UpdateDesktopDatabase,
    ];

    /// Line printed before the step runs.
    pub fn status_line(&self) -> &'static str {
        match self {
            HookStep::CompileSchemas => "Compiling gsettings schemas...",
            HookStep::UpdateIconCache => "Updating icon cache...",
            HookStep::UpdateDesktopDatabase => "Updating desktop database...",
        }
    }

    /// Program that performs this step.
    pub fn program<'a>(&self, tools: &'a Tools) -> &'a OsStr {
        match self {
            HookStep::CompileSchemas => &tools.schema_compiler,
            HookStep::UpdateIconCache => &tools.icon_cache_updater,
            HookStep::UpdateDesktopDatabase => &tools.desktop_db_updater,
        }
    }

    /// Build the concrete invocation for this step under `prefix`.
    pub fn invocation(&self, prefix: &Path, tools: &Tools) -> Invocation {
        let args = match self {
            HookStep::CompileSchemas => vec![schema_dir(prefix).into_os_string()],
            HookStep::UpdateIconCache => vec![
                OsString::from("-f"),
                OsString::from("-t"),
                icon_theme_dir(prefix).into_os_string(),
            ],
            HookStep::UpdateDesktopDatabase => vec![icon_theme_dir(prefix).into_os_string()],
        };

        Invocation {
            step: *self,
            program: self.program(tools).to_os_string(),
            args,
        }
    }
}

impl std::fmt::Display for HookStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HookStep::CompileSchemas => "compile-schemas",
            HookStep::UpdateIconCache => "update-icon-cache",
            HookStep::UpdateDesktopDatabase => "update-desktop-database",
        };
        f.write_str(name)
    }
}

/// `<prefix>/share/glib-2.0/schemas`
pub fn schema_dir(prefix: &Path) -> PathBuf {
    prefix.join(SCHEMA_DIR)
}

/// `<prefix>/share/icons/hicolor`
pub fn icon_theme_dir(prefix: &Path) -> PathBuf {
    prefix.join(ICON_THEME_DIR)
}

/// Which steps to run.
///
/// The full set is the default. `schemas_only` covers projects that ship
/// settings schemas but no icons or desktop entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookSteps {
    pub compile_schemas: bool,
    pub update_icon_cache: bool,
    pub update_desktop_db: bool,
}

impl HookSteps {
    pub fn full() -> Self {
        Self {
            compile_schemas: true,
            update_icon_cache: true,
            update_desktop_db: true,
        }
    }

    pub fn schemas_only() -> Self {
        Self {
            compile_schemas: true,
            update_icon_cache: false,
            update_desktop_db: false,
        }
    }

    pub fn is_enabled(&self, step: HookStep) -> bool {
        match step {
            HookStep::CompileSchemas => self.compile_schemas,
            HookStep::UpdateIconCache => self.update_icon_cache,
            HookStep::UpdateDesktopDatabase => self.update_desktop_db,
        }
    }

    /// Enabled steps in execution order.
    pub fn enabled(&self) -> impl Iterator<Item = HookStep> + '_ {
        HookStep::ALL.into_iter().filter(|s| self.is_enabled(*s))
    }
}

impl Default for HookSteps {
    fn default() -> Self {
        Self::full()
    }
}

/// A fully resolved external command. Arguments are passed to the tool
/// byte for byte; only display and JSON output are lossy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub step: HookStep,
    #[serde(serialize_with = "lossy::serialize")]
    pub program: OsString,
    #[serde(serialize_with = "lossy::serialize_seq")]
    pub args: Vec<OsString>,
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Executes invocations. The hook only cares about the outcome.
pub trait StepRunner {
    fn run(&mut self, invocation: &Invocation) -> StepOutcome;
}

/// Runs invocations as real child processes, blocking on each.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl StepRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> StepOutcome {
        Cmd::new(&invocation.program)
            .args(&invocation.args)
            .run_best_effort()
    }
}

/// One executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub invocation: Invocation,
    pub outcome: StepOutcome,
}

/// What the hook did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HookReport {
    /// A staging root was set; nothing ran.
    Skipped {
        #[serde(serialize_with = "lossy::serialize")]
        staging_root: PathBuf,
    },
    /// Steps ran, in order.
    Ran { results: Vec<StepResult> },
}

impl HookReport {
    pub fn results(&self) -> &[StepResult] {
        match self {
            HookReport::Skipped { .. } => &[],
            HookReport::Ran { results } => results,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.results()
            .iter()
            .filter(|r| !r.outcome.is_success())
            .count()
    }

    /// Print per-step outcomes. Write errors are ignored.
    pub fn print(&self) {
        let mut out = io::stdout().lock();
        match self {
            HookReport::Skipped { staging_root } => {
                let _ = writeln!(
                    out,
                    "Staging root {} set, skipping cache refresh.",
                    staging_root.display()
                );
            }
            HookReport::Ran { results } => {
                for result in results {
                    let _ = writeln!(out, "  [{}] {}", result.outcome, result.invocation);
                }
            }
        }
    }
}

/// The post-install hook, parameterized by which steps to run.
#[derive(Debug, Clone)]
pub struct PostInstallHook {
    config: Config,
    steps: HookSteps,
}

impl PostInstallHook {
    pub fn new(config: Config, steps: HookSteps) -> Self {
        Self { config, steps }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn steps(&self) -> HookSteps {
        self.steps
    }

    /// Invocations that `run` would execute. Empty when staged.
    pub fn plan(&self) -> anyhow::Result<Vec<Invocation>> {
        if self.config.is_staged() {
            return Ok(Vec::new());
        }
        let prefix = self.config.require_prefix()?;
        Ok(self
            .steps
            .enabled()
            .map(|step| step.invocation(prefix, &self.config.tools))
            .collect())
    }

    /// Run every enabled step in order.
    ///
    /// Errors only when the configuration is unusable (no prefix while not
    /// staged), before any step has run. Step failures never abort the run.
    pub fn run(&self, runner: &mut dyn StepRunner) -> anyhow::Result<HookReport> {
        if let Some(staging_root) = &self.config.destdir {
            return Ok(HookReport::Skipped {
                staging_root: staging_root.clone(),
            });
        }

        let mut results = Vec::new();
        for invocation in self.plan()? {
            // A closed stdout must not stop the hook.
            let _ = writeln!(io::stdout(), "{}", invocation.step.status_line());
            let outcome = runner.run(&invocation);
            results.push(StepResult {
                invocation,
                outcome,
            });
        }

        Ok(HookReport::Ran { results })
    }
}
