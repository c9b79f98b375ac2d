// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use anyhow::{Context, Result};
use frank_types::constants::{DATA_URL, UPDATE_INTERVAL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_ENTRY_PATH: &str = "./data/frank_energie.json";
const MAX_UPDATE_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

fn default_data_url() -> String {
    DATA_URL.to_string()
}

fn default_entry_path() -> PathBuf {
    PathBuf::from(DEFAULT_ENTRY_PATH)
}

fn default_update_interval_minutes() -> u64 {
    UPDATE_INTERVAL.as_secs() / 60
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// GraphQL endpoint
    #[serde(default = "default_data_url")]
    pub data_url: String,

    /// Config entry file holding tokens and the site reference
    #[serde(default = "default_entry_path")]
    pub entry_path: PathBuf,

    #[serde(default = "default_update_interval_minutes")]
    pub update_interval_minutes: u64,

    /// Used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_url: default_data_url(),
            entry_path: default_entry_path(),
            update_interval_minutes: default_update_interval_minutes(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration and describe where it came from.
    ///
    /// An explicit path must exist. Without one, `config.toml` and then
    /// `config.json` in the working directory are tried before defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<(Self, String)> {
        let (mut config, source) = match path {
            Some(path) => (Self::from_file(path)?, path.display().to_string()),
            None => {
                let candidates = [Path::new("config.toml"), Path::new("config.json")];
                match candidates.iter().find(|candidate| candidate.exists()) {
                    Some(found) => (Self::from_file(found)?, found.display().to_string()),
                    None => (Self::default(), "defaults".to_string()),
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, source))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
        }
    }

    /// Apply `FRANK_ENERGIE_*` overrides looked up through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("FRANK_ENERGIE_DATA_URL") {
            self.data_url = url;
        }

        if let Some(path) = lookup("FRANK_ENERGIE_ENTRY_PATH") {
            self.entry_path = PathBuf::from(path);
        }

        if let Some(interval) = lookup("FRANK_ENERGIE_UPDATE_INTERVAL_MINUTES")
            && let Ok(minutes) = interval.parse::<u64>()
        {
            self.update_interval_minutes = minutes;
        }

        if let Some(level) = lookup("FRANK_ENERGIE_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_url.trim().is_empty() {
            anyhow::bail!("data_url cannot be empty");
        }
        if self.entry_path.as_os_str().is_empty() {
            anyhow::bail!("entry_path cannot be empty");
        }
        if self.update_interval_minutes == 0 {
            anyhow::bail!("update_interval_minutes must be greater than 0");
        }
        if self.update_interval_minutes > MAX_UPDATE_INTERVAL_MINUTES {
            anyhow::bail!(
                "update_interval_minutes must be at most {MAX_UPDATE_INTERVAL_MINUTES} (one week)"
            );
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_minutes.saturating_mul(60))
    }
}
