//! post-install - refresh desktop caches after `meson install`.
//!
//! Compiles the GSettings schema cache, rebuilds the hicolor icon cache and
//! updates the desktop database under the install prefix. Does nothing when
//! installing into a staging root (`DESTDIR`).

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

use post_install_hook::commands;
use post_install_hook::config::Config;
use post_install_hook::hook::{HookSteps, PostInstallHook};

#[derive(Parser)]
#[command(name = "post-install")]
#[command(about = "Refresh schema, icon and desktop caches after installation")]
#[command(
    after_help = "Typically registered with meson:\n  meson.add_install_script('post-install')\n\nEvery step is best effort: missing or failing tools never fail the install."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // OsString rather than PathBuf: paths may be non-UTF-8, and an empty
    // value must parse (it means "unset").
    /// Install prefix
    #[arg(long, global = true, env = "MESON_INSTALL_PREFIX")]
    prefix: Option<OsString>,

    /// Staging root; when non-empty nothing is refreshed
    #[arg(long, global = true, env = "DESTDIR")]
    destdir: Option<OsString>,

    /// Which set of steps to run
    #[arg(long, global = true, value_enum, default_value_t = Variant::Full)]
    variant: Variant,

    /// Skip the icon cache step
    #[arg(long, global = true)]
    no_icon_cache: bool,

    /// Skip the desktop database step
    #[arg(long, global = true)]
    no_desktop_database: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the hook (default)
    Run {
        /// Print each step's outcome afterwards
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the commands the hook would run, without running them
    Plan {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the maintainer tools are installed
    Preflight {
        /// Fail if any enabled tool is missing (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show resolved configuration
    Config {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    /// Schemas, icon cache and desktop database
    Full,
    /// Schema compilation only
    SchemasOnly,
}

impl Cli {
    fn steps(&self) -> HookSteps {
        let mut steps = match self.variant {
            Variant::Full => HookSteps::full(),
            Variant::SchemasOnly => HookSteps::schemas_only(),
        };
        if self.no_icon_cache {
            steps.update_icon_cache = false;
        }
        if self.no_desktop_database {
            steps.update_desktop_db = false;
        }
        steps
    }
}

fn main() -> Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let steps = cli.steps();
    let config = Config::load().with_overrides(
        cli.prefix.map(PathBuf::from),
        cli.destdir.map(PathBuf::from),
    );

    match cli.command {
        None => {
            commands::cmd_run(&PostInstallHook::new(config, steps), false)?;
        }

        Some(Commands::Run { verbose }) => {
            commands::cmd_run(&PostInstallHook::new(config, steps), verbose)?;
        }

        Some(Commands::Plan { json }) => {
            commands::cmd_plan(&PostInstallHook::new(config, steps), json)?;
        }

        Some(Commands::Preflight { strict }) => {
            commands::cmd_preflight(&PostInstallHook::new(config, steps), strict)?;
        }

        Some(Commands::Show { what }) => {
            let show_target = match what {
                ShowTarget::Config { json } => commands::show::ShowTarget::Config { json },
            };
            commands::cmd_show(show_target, &config)?;
        }
    }

    Ok(())
}
