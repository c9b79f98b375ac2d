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

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost overview for the running month of a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub actual_costs_until_last_meter_reading_date: f64,
    pub expected_costs_until_last_meter_reading_date: f64,
    /// Expected costs for the whole month
    pub expected_costs: f64,
    pub last_meter_reading_date: NaiveDate,
}

impl MonthSummary {
    /// Positive when actual costs are above the expected costs so far
    pub fn difference_until_last_meter_reading(&self) -> f64 {
        self.actual_costs_until_last_meter_reading_date
            - self.expected_costs_until_last_meter_reading_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "StartDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "PeriodDescription")]
    pub period_description: String,
    #[serde(rename = "TotalAmount")]
    pub total_amount: f64,
}

/// Invoices around the current billing period. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoices {
    #[serde(default)]
    pub previous_period_invoice: Option<Invoice>,
    #[serde(default)]
    pub current_period_invoice: Option<Invoice>,
    #[serde(default)]
    pub upcoming_period_invoice: Option<Invoice>,
}

/// Access and refresh token pair issued by login or renewal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub auth_token: String,
    pub refresh_token: String,
}

impl AuthTokens {
    pub fn new(auth_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens end up in logs via `{:?}` far too easily
impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokens")
            .field("auth_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
