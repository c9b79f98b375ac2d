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

use crate::account::{Invoices, MonthSummary};
use crate::price::PriceSeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one refresh cycle, shared read-only with consumers.
///
/// The coordinator replaces the whole snapshot on success and keeps the
/// previous one untouched otherwise, so consumers never see a mix of cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshSnapshot {
    pub electricity: PriceSeries,
    pub gas: PriceSeries,
    pub month_summary: Option<MonthSummary>,
    pub invoices: Option<Invoices>,
}

impl RefreshSnapshot {
    /// Both commodities still have a price that has not elapsed at `now`
    pub fn has_future_prices(&self, now: DateTime<Utc>) -> bool {
        self.electricity.has_future_prices(now) && self.gas.has_future_prices(now)
    }
}
