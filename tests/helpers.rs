//! Shared test utilities for post-install tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use post_install_hook::config::{Config, Tools};

/// Test environment with a temporary prefix and a directory of mock tools.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Install prefix handed to the hook
    pub prefix: PathBuf,
    /// Directory holding mock tool scripts
    pub bin_dir: PathBuf,
    /// Every mock tool appends one line per call here
    pub log: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with temporary directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let prefix = base.join("prefix");
        let bin_dir = base.join("bin");
        let log = base.join("calls.log");

        fs::create_dir_all(&prefix).expect("Failed to create prefix dir");
        fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");

        Self {
            _temp_dir: temp_dir,
            prefix,
            bin_dir,
            log,
        }
    }

    /// Install a mock tool that logs `name arg...` and exits with `exit_code`.
    pub fn mock_tool(&self, name: &str, exit_code: i32) -> PathBuf {
        let path = self.bin_dir.join(name);
        let script = format!(
            "#!/bin/sh\necho \"{} $*\" >> '{}'\nexit {}\n",
            name,
            self.log.display(),
            exit_code
        );
        create_executable(&path, &script);
        path
    }

    /// Mock all three tools with the given exit codes.
    pub fn mock_tools(&self, codes: [i32; 3]) -> Tools {
        Tools {
            schema_compiler: self.mock_tool("glib-compile-schemas", codes[0]).into_os_string(),
            icon_cache_updater: self.mock_tool("gtk-update-icon-cache", codes[1]).into_os_string(),
            desktop_db_updater: self
                .mock_tool("update-desktop-database", codes[2])
                .into_os_string(),
        }
    }

    /// Config pointing at this environment's prefix.
    pub fn config(&self, tools: Tools) -> Config {
        Config {
            destdir: None,
            prefix: Some(self.prefix.clone()),
            tools,
        }
    }

    /// Logged calls, one per line. Empty if nothing ran.
    pub fn calls(&self) -> Vec<String> {
        self.raw_calls()
            .iter()
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    /// Logged calls as raw bytes, for non-UTF-8 arguments.
    pub fn raw_calls(&self) -> Vec<Vec<u8>> {
        fs::read(&self.log)
            .map(|bytes| {
                bytes
                    .split(|b| *b == b'\n')
                    .filter(|line| !line.is_empty())
                    .map(<[u8]>::to_vec)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn prefix_str(&self) -> String {
        path_str(&self.prefix)
    }
}

/// Write an executable script.
pub fn create_executable(path: &Path, content: &str) {
    fs::write(path, content).expect("Failed to write script");
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
