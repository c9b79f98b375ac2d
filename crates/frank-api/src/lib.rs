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

//! Client side of the Frank Energie GraphQL API.
//!
//! The coordinator only depends on [`FrankEnergieClient`]; [`FrankEnergieApi`]
//! is the HTTP implementation used by the service binary.

pub mod api;
pub mod client;
pub mod errors;
mod queries;

pub use api::FrankEnergieApi;
pub use client::FrankEnergieClient;
pub use errors::{ApiError, ApiResult};
