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

//! Error types for the coordinator crate

use thiserror::Error;

/// Outcome of a failed refresh cycle, as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// The cycle produced no data; the next scheduled cycle retries
    #[error("update failed: {0}")]
    UpdateFailed(String),

    /// Credentials are no longer usable; the user has to log in again
    #[error("reauthentication required: {0}")]
    ReauthRequired(String),
}

impl UpdateError {
    pub fn is_reauth(&self) -> bool {
        matches!(self, Self::ReauthRequired(_))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("config entry io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config entry serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
