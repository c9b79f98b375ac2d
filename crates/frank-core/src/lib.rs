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

//! Refresh coordinator for Frank Energie price and account data.
//!
//! [`FrankEnergieCoordinator`] produces a [`RefreshSnapshot`](frank_types::RefreshSnapshot)
//! per cycle; [`UpdateScheduler`] drives it on an interval and on demand.

pub mod config_entry;
pub mod coordinator;
pub mod error;
pub mod scheduler;

pub use config_entry::{ConfigEntry, ConfigEntryStore, JsonFileStore, MemoryStore};
pub use coordinator::{FrankEnergieCoordinator, fetch_windows};
pub use error::{StoreError, UpdateError};
pub use scheduler::{RefreshHandle, RefreshSource, UpdateScheduler, UpdateStatus};
