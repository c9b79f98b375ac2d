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
use std::ops::Add;

/// A single price interval `[from, till)` as returned by the market price queries.
///
/// All components are in EUR per unit (kWh for electricity, m³ for gas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub from: DateTime<Utc>,
    pub till: DateTime<Utc>,
    pub market_price: f64,
    pub market_price_tax: f64,
    pub sourcing_markup_price: f64,
    pub energy_tax_price: f64,
}

impl Price {
    /// All-in price: market price plus taxes and markup
    pub fn total(&self) -> f64 {
        self.market_price
            + self.market_price_tax
            + self.sourcing_markup_price
            + self.energy_tax_price
    }

    /// Whether `now` falls inside this interval
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.from <= now && now < self.till
    }

    /// Whether the interval has not fully elapsed at `now`
    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        self.till > now
    }
}

/// Ordered prices for one commodity over a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<Price>);

impl PriceSeries {
    pub fn new(prices: Vec<Price>) -> Self {
        Self(prices)
    }

    pub fn all(&self) -> &[Price] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Prices whose interval ends after `now`, including the running one
    pub fn future_prices(&self, now: DateTime<Utc>) -> PriceSeries {
        self.0.iter().filter(|p| p.is_future(now)).cloned().collect()
    }

    pub fn has_future_prices(&self, now: DateTime<Utc>) -> bool {
        self.0.iter().any(|p| p.is_future(now))
    }

    /// Price of the interval running at `now`
    pub fn current(&self, now: DateTime<Utc>) -> Option<&Price> {
        self.0.iter().find(|p| p.contains(now))
    }

    /// Prices starting on the given UTC date
    pub fn for_date(&self, date: NaiveDate) -> PriceSeries {
        self.0
            .iter()
            .filter(|p| p.from.date_naive() == date)
            .cloned()
            .collect()
    }

    pub fn min_future(&self, now: DateTime<Utc>) -> Option<&Price> {
        self.0
            .iter()
            .filter(|p| p.is_future(now))
            .min_by(|a, b| a.total().total_cmp(&b.total()))
    }

    pub fn max_future(&self, now: DateTime<Utc>) -> Option<&Price> {
        self.0
            .iter()
            .filter(|p| p.is_future(now))
            .max_by(|a, b| a.total().total_cmp(&b.total()))
    }

    /// Mean total price over the future intervals
    pub fn average_future(&self, now: DateTime<Utc>) -> Option<f64> {
        let (sum, count) = self
            .0
            .iter()
            .filter(|p| p.is_future(now))
            .fold((0.0, 0u32), |(sum, count), p| (sum + p.total(), count + 1));

        if count == 0 {
            None
        } else {
            Some(sum / f64::from(count))
        }
    }
}

impl Add for PriceSeries {
    type Output = PriceSeries;

    fn add(mut self, rhs: PriceSeries) -> PriceSeries {
        self.0.extend(rhs.0);
        self
    }
}

impl FromIterator<Price> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = Price>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Price>> for PriceSeries {
    fn from(prices: Vec<Price>) -> Self {
        Self(prices)
    }
}

/// Electricity and gas prices for one date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketPrices {
    pub electricity: PriceSeries,
    pub gas: PriceSeries,
}

impl MarketPrices {
    pub fn new(electricity: PriceSeries, gas: PriceSeries) -> Self {
        Self { electricity, gas }
    }

    /// Both commodities carry at least one price
    pub fn is_complete(&self) -> bool {
        !self.electricity.is_empty() && !self.gas.is_empty()
    }
}
