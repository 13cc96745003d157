//! Where the harness reads config and keeps drafts, send history and logs
//!
//! Config comes from, in order: `--config`, `$CIDER_CONFIG`, then
//! `config.yaml` in the config dir. Drafts, send history and logs go in the
//! data dir, which `--data-dir` overrides.
//!
//! Unix/macOS:
//!   - config dir: `$XDG_CONFIG_HOME/cider`, else `~/.config/cider`
//!   - data dir: `$XDG_DATA_HOME/cider`, else `~/.local/share/cider`
//!
//! Windows:
//!   - config dir: `%APPDATA%\cider`
//!   - data dir: `%LOCALAPPDATA%\cider`

use std::{
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

const APP_DIR: &str = "cider";

/// Overrides the config file location when no `--config` is given
pub const CONFIG_ENV: &str = "CIDER_CONFIG";

pub const CONFIG_FILE: &str = "config.yaml";

/// Single JSON file holding drafts and send history for every room
pub const STORAGE_FILE: &str = "storage.json";

/// Prefix of the daily-rotated log files
pub const LOG_FILE_PREFIX: &str = "cider.log";

/// Resolved file locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config_file: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl Paths {
    /// Resolve against the process environment
    pub fn resolve(config_override: Option<&Path>, data_override: Option<&Path>) -> Self {
        Self::resolve_from(
            config_override,
            data_override,
            &Env {
                config_file: env::var_os(CONFIG_ENV),
                config_home: platform_config_home(),
                data_home: platform_data_home(),
            },
        )
    }

    fn resolve_from(
        config_override: Option<&Path>,
        data_override: Option<&Path>,
        env: &Env,
    ) -> Self {
        let config_file = config_override
            .map(Path::to_path_buf)
            .or_else(|| {
                env.config_file
                    .as_ref()
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| {
                env.config_home
                    .as_ref()
                    .map(|home| home.join(APP_DIR).join(CONFIG_FILE))
            });

        let data_dir = data_override
            .map(Path::to_path_buf)
            .or_else(|| env.data_home.as_ref().map(|home| home.join(APP_DIR)));

        Self {
            config_file,
            data_dir,
        }
    }

    /// `<data>/storage.json`
    pub fn storage_file(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(STORAGE_FILE))
    }

    /// `<data>/logs/`
    pub fn logs_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("logs"))
    }

    /// Ensure the logs dir exists, returning it
    pub fn ensure_logs_dir(&self) -> Result<PathBuf> {
        let logs = self.logs_dir().context("No data directory available")?;
        fs::create_dir_all(&logs)
            .with_context(|| format!("Failed to create directory {}", logs.display()))?;
        Ok(logs)
    }
}

/// Environment inputs to path resolution
struct Env {
    config_file: Option<OsString>,
    config_home: Option<PathBuf>,
    data_home: Option<PathBuf>,
}

#[cfg(target_os = "windows")]
fn platform_config_home() -> Option<PathBuf> {
    env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(target_os = "windows")]
fn platform_data_home() -> Option<PathBuf> {
    env::var_os("LOCALAPPDATA").map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn platform_config_home() -> Option<PathBuf> {
    xdg_or_home("XDG_CONFIG_HOME", ".config")
}

#[cfg(not(target_os = "windows"))]
fn platform_data_home() -> Option<PathBuf> {
    xdg_or_home("XDG_DATA_HOME", ".local/share")
}

#[cfg(not(target_os = "windows"))]
fn xdg_or_home(var: &str, fallback: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(fallback)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Env {
        Env {
            config_file: None,
            config_home: Some(PathBuf::from("/home/u/.config")),
            data_home: Some(PathBuf::from("/home/u/.local/share")),
        }
    }

    #[test]
    fn test_platform_defaults() {
        let paths = Paths::resolve_from(None, None, &env());
        assert_eq!(
            paths.config_file,
            Some(PathBuf::from("/home/u/.config/cider/config.yaml"))
        );
        assert_eq!(
            paths.storage_file(),
            Some(PathBuf::from("/home/u/.local/share/cider/storage.json"))
        );
        assert_eq!(
            paths.logs_dir(),
            Some(PathBuf::from("/home/u/.local/share/cider/logs"))
        );
    }

    #[test]
    fn test_config_lookup_order() {
        let mut env = env();
        env.config_file = Some(OsString::from("/etc/cider.yaml"));
        let from_env = Paths::resolve_from(None, None, &env);
        assert_eq!(from_env.config_file, Some(PathBuf::from("/etc/cider.yaml")));

        let from_flag = Paths::resolve_from(Some(Path::new("mine.yaml")), None, &env);
        assert_eq!(from_flag.config_file, Some(PathBuf::from("mine.yaml")));

        // an empty variable is ignored
        env.config_file = Some(OsString::new());
        let ignored = Paths::resolve_from(None, None, &env);
        assert_eq!(
            ignored.config_file,
            Some(PathBuf::from("/home/u/.config/cider/config.yaml"))
        );
    }

    #[test]
    fn test_data_dir_override() {
        let paths = Paths::resolve_from(None, Some(Path::new("/tmp/run")), &env());
        assert_eq!(
            paths.storage_file(),
            Some(PathBuf::from("/tmp/run/storage.json"))
        );
        assert_eq!(paths.logs_dir(), Some(PathBuf::from("/tmp/run/logs")));
    }

    #[test]
    fn test_no_home_resolves_nothing() {
        let env = Env {
            config_file: None,
            config_home: None,
            data_home: None,
        };
        let paths = Paths::resolve_from(None, None, &env);
        assert_eq!(paths.config_file, None);
        assert_eq!(paths.storage_file(), None);
        assert!(paths.ensure_logs_dir().is_err());
    }

    #[test]
    fn test_ensure_logs_dir_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::resolve_from(None, Some(dir.path()), &env());
        let logs = paths.ensure_logs_dir().unwrap();
        assert!(logs.is_dir());
        assert_eq!(logs, dir.path().join("logs"));
    }
}
