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

//! Static configuration keys and endpoints.

use std::time::Duration;

pub const ATTRIBUTION: &str = "Data provided by Frank Energie";
pub const COMPONENT_TITLE: &str = "Frank Energie";

/// GraphQL endpoint used instead of the client's built-in default.
pub const DATA_URL: &str = "https://www.frankenergie.be/graphql/";

/// How often the coordinator refreshes its snapshot.
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(60 * 60);

// Config entry keys
pub const CONF_ACCESS_TOKEN: &str = "access_token";
pub const CONF_TOKEN: &str = "token";
pub const CONF_SITE_REFERENCE: &str = "site_reference";

// Snapshot field names as exposed to consumers
pub const DATA_ELECTRICITY: &str = "electricity";
pub const DATA_GAS: &str = "gas";
pub const DATA_MONTH_SUMMARY: &str = "month_summary";
pub const DATA_INVOICES: &str = "invoices";
