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

//! Persistence of the config entry holding credentials and the site reference.

use crate::error::StoreError;
use frank_types::AuthTokens;
use frank_types::constants::{
    COMPONENT_TITLE, CONF_ACCESS_TOKEN, CONF_SITE_REFERENCE, CONF_TOKEN,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Key/value data of one configured account, keyed by the `CONF_*` constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub title: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Default for ConfigEntry {
    fn default() -> Self {
        Self {
            title: COMPONENT_TITLE.to_string(),
            data: Map::new(),
        }
    }
}

impl ConfigEntry {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn access_token(&self) -> Option<&str> {
        self.get_str(CONF_ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.get_str(CONF_TOKEN)
    }

    pub fn site_reference(&self) -> Option<&str> {
        self.get_str(CONF_SITE_REFERENCE)
    }

    /// Stored token pair, if both halves are present
    pub fn tokens(&self) -> Option<AuthTokens> {
        Some(AuthTokens::new(self.access_token()?, self.refresh_token()?))
    }

    /// Data update writing a token pair under the fixed keys
    pub fn token_data(tokens: &AuthTokens) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(
            CONF_ACCESS_TOKEN.to_string(),
            Value::String(tokens.auth_token.clone()),
        );
        data.insert(
            CONF_TOKEN.to_string(),
            Value::String(tokens.refresh_token.clone()),
        );
        data
    }

    /// Overwrite the given keys, leaving all others in place
    pub fn merge(&mut self, data: Map<String, Value>) {
        self.data.extend(data);
    }
}

/// Read/update access to the persisted config entry.
pub trait ConfigEntryStore: Send + Sync {
    fn entry(&self) -> ConfigEntry;

    /// Merge `data` into the entry and persist it
    fn update_entry(&self, data: Map<String, Value>) -> Result<(), StoreError>;
}

/// Config entry kept in a JSON file, written atomically.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entry: RwLock<ConfigEntry>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file yields an empty entry
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entry = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            info!(
                "Config entry not found at {}, starting empty",
                path.display()
            );
            ConfigEntry::default()
        };

        Ok(Self {
            path,
            entry: RwLock::new(entry),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, picking up changes made by another process
    pub fn reload(&self) -> Result<ConfigEntry, StoreError> {
        let content = fs::read_to_string(&self.path)?;
        let entry: ConfigEntry = serde_json::from_str(&content)?;
        *self.entry.write() = entry.clone();
        Ok(entry)
    }

    fn save(&self, entry: &ConfigEntry) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let content = serde_json::to_string_pretty(entry)?;

        // Atomic write
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;

        debug!("Saved config entry to {}", self.path.display());
        Ok(())
    }
}

impl ConfigEntryStore for JsonFileStore {
    fn entry(&self) -> ConfigEntry {
        self.entry.read().clone()
    }

    fn update_entry(&self, data: Map<String, Value>) -> Result<(), StoreError> {
        let mut entry = self.entry.write();
        let mut updated = entry.clone();
        updated.merge(data);

        // Memory only changes once the file is written
        self.save(&updated)?;
        *entry = updated;
        Ok(())
    }
}

/// In-memory config entry, for embedding hosts that persist elsewhere and for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entry: RwLock<ConfigEntry>,
}

impl MemoryStore {
    pub fn new(entry: ConfigEntry) -> Self {
        Self {
            entry: RwLock::new(entry),
        }
    }
}

impl ConfigEntryStore for MemoryStore {
    fn entry(&self) -> ConfigEntry {
        self.entry.read().clone()
    }

    fn update_entry(&self, data: Map<String, Value>) -> Result<(), StoreError> {
        self.entry.write().merge(data);
        Ok(())
    }
}
