// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::defs;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub verbose: bool,
    /// Print the pass-scoped discovery diagnostics to stderr after a run.
    pub dump_debug_log: bool,
    /// Base directories scanned for accessible removable-volume mounts.
    pub media_dirs: Vec<PathBuf>,
    /// Upper bound on waiting for `df` output when statfs is unusable.
    pub df_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            dump_debug_log: false,
            media_dirs: vec![PathBuf::from(defs::MEDIA_RW_DIR)],
            df_timeout_ms: 2000,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn load_default() -> Result<Self> {
        Self::from_file(Path::new(defs::CONFIG_FILE_DEFAULT))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    pub fn merge_with_cli(&mut self, verbose: bool, debug_log: bool, df_timeout_ms: Option<u64>) {
        if verbose {
            self.verbose = true;
        }
        if debug_log {
            self.dump_debug_log = true;
        }
        if let Some(ms) = df_timeout_ms {
            self.df_timeout_ms = ms;
        }
    }

    pub fn df_timeout(&self) -> Duration {
        Duration::from_millis(self.df_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.verbose = true;
        config.media_dirs.push(PathBuf::from("/mnt/runtime/write"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert!(loaded.verbose);
        assert_eq!(loaded.media_dirs.len(), 2);
        assert_eq!(loaded.df_timeout_ms, 2000);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = toml::from_str("verbose = true\n").unwrap();
        assert!(config.verbose);
        assert!(!config.dump_debug_log);
        assert_eq!(config.media_dirs, vec![PathBuf::from(defs::MEDIA_RW_DIR)]);
    }

    #[test]
    fn cli_merge_only_overrides_set_values() {
        let mut config = Config::default();
        config.merge_with_cli(false, true, Some(500));
        assert!(!config.verbose);
        assert!(config.dump_debug_log);
        assert_eq!(config.df_timeout(), Duration::from_millis(500));
    }
}
