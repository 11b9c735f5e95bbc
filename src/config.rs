//! Invocation context for the post-install hook.
//!
//! Reads the staging root, the install prefix and tool overrides from
//! environment variables. A `.env` file is loaded by the binary beforehand;
//! real environment variables take precedence over it.

use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// Staging root set by the build system when installing into a temporary tree.
pub const ENV_DESTDIR: &str = "DESTDIR";
/// Install prefix exported by meson to install scripts.
pub const ENV_INSTALL_PREFIX: &str = "MESON_INSTALL_PREFIX";
pub const ENV_SCHEMA_COMPILER: &str = "GLIB_COMPILE_SCHEMAS";
pub const ENV_ICON_CACHE_UPDATER: &str = "GTK_UPDATE_ICON_CACHE";
pub const ENV_DESKTOP_DB_UPDATER: &str = "UPDATE_DESKTOP_DATABASE";

pub const DEFAULT_SCHEMA_COMPILER: &str = "glib-compile-schemas";
pub const DEFAULT_ICON_CACHE_UPDATER: &str = "gtk-update-icon-cache";
pub const DEFAULT_DESKTOP_DB_UPDATER: &str = "update-desktop-database";

/// Every variable the hook reads.
pub const ENV_KEYS: [&str; 5] = [
    ENV_DESTDIR,
    ENV_INSTALL_PREFIX,
    ENV_SCHEMA_COMPILER,
    ENV_ICON_CACHE_UPDATER,
    ENV_DESKTOP_DB_UPDATER,
];

/// Programs used for each step. Overridable for distros that ship them
/// under different names, and for tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tools {
    #[serde(serialize_with = "lossy::serialize")]
    pub schema_compiler: OsString,
    #[serde(serialize_with = "lossy::serialize")]
    pub icon_cache_updater: OsString,
    #[serde(serialize_with = "lossy::serialize")]
    pub desktop_db_updater: OsString,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            schema_compiler: DEFAULT_SCHEMA_COMPILER.into(),
            icon_cache_updater: DEFAULT_ICON_CACHE_UPDATER.into(),
            desktop_db_updater: DEFAULT_DESKTOP_DB_UPDATER.into(),
        }
    }
}

/// Hook configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Staging root. `Some` only when set and non-empty.
    #[serde(serialize_with = "lossy::serialize_option")]
    pub destdir: Option<PathBuf>,
    /// Install prefix (e.g. /usr or /usr/local).
    #[serde(serialize_with = "lossy::serialize_option")]
    pub prefix: Option<PathBuf>,
    pub tools: Tools,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Only `ENV_KEYS` are read, as raw OS strings; unrelated variables may
    /// hold any bytes.
    pub fn load() -> Self {
        let vars = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var_os(key).map(|value| (key.to_string(), value)))
            .collect();
        Self::from_vars(&vars)
    }

    /// Build configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, OsString>) -> Self {
        let non_empty = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let defaults = Tools::default();
        let tools = Tools {
            schema_compiler: non_empty(ENV_SCHEMA_COMPILER).unwrap_or(defaults.schema_compiler),
            icon_cache_updater: non_empty(ENV_ICON_CACHE_UPDATER)
                .unwrap_or(defaults.icon_cache_updater),
            desktop_db_updater: non_empty(ENV_DESKTOP_DB_UPDATER)
                .unwrap_or(defaults.desktop_db_updater),
        };

        Self {
            destdir: non_empty(ENV_DESTDIR).map(PathBuf::from),
            prefix: non_empty(ENV_INSTALL_PREFIX).map(PathBuf::from),
            tools,
        }
    }

    /// Apply command-line overrides. Empty values are ignored so that
    /// `--destdir ""` behaves like an unset staging root.
    pub fn with_overrides(mut self, prefix: Option<PathBuf>, destdir: Option<PathBuf>) -> Self {
        if let Some(prefix) = prefix.filter(|p| !p.as_os_str().is_empty()) {
            self.prefix = Some(prefix);
        }
        if let Some(destdir) = destdir {
            self.destdir = if destdir.as_os_str().is_empty() {
                None
            } else {
                Some(destdir)
            };
        }
        self
    }

    /// True when installing into a staging root; caches must not be touched.
    pub fn is_staged(&self) -> bool {
        self.destdir.is_some()
    }

    /// The install prefix, required whenever the hook is not staged.
    pub fn require_prefix(&self) -> Result<&PathBuf> {
        match &self.prefix {
            Some(prefix) => Ok(prefix),
            None => bail!(
                "{} is not set. Pass --prefix or run from a meson install script.",
                ENV_INSTALL_PREFIX
            ),
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        match &self.destdir {
            Some(dir) => println!("  {}: {} (staged, caches skipped)", ENV_DESTDIR, dir.display()),
            None => println!("  {}: (unset)", ENV_DESTDIR),
        }
        match &self.prefix {
            Some(prefix) => println!("  {}: {}", ENV_INSTALL_PREFIX, prefix.display()),
            None => println!("  {}: (unset)", ENV_INSTALL_PREFIX),
        }
        println!("  {}: {}", ENV_SCHEMA_COMPILER, self.tools.schema_compiler.to_string_lossy());
        println!("  {}: {}", ENV_ICON_CACHE_UPDATER, self.tools.icon_cache_updater.to_string_lossy());
        println!("  {}: {}", ENV_DESKTOP_DB_UPDATER, self.tools.desktop_db_updater.to_string_lossy());
    }
}

/// Serialize OS strings and paths as (lossy) UTF-8 text for JSON output.
pub(crate) mod lossy {
    use serde::Serializer;
    use std::ffi::{OsStr, OsString};

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<OsStr>,
    {
        serializer.serialize_str(&value.as_ref().to_string_lossy())
    }

    pub fn serialize_option<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<OsStr>,
    {
        match value {
            Some(value) => serializer.serialize_some(&value.as_ref().to_string_lossy()),
            None => serializer.serialize_none(),
        }
    }

    pub fn serialize_seq<S>(values: &[OsString], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(|v| v.to_string_lossy()))
    }
}
