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

use crate::errors::ApiResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use frank_types::{AuthTokens, Invoices, MarketPrices, MonthSummary};
use std::sync::Arc;

/// Operations the refresh coordinator needs from the Frank Energie API.
#[async_trait]
pub trait FrankEnergieClient: Send + Sync {
    /// Whether calls are made on behalf of a logged-in account
    fn is_authenticated(&self) -> bool;

    /// Public market prices for `[start, end)`
    async fn prices(&self, start: NaiveDate, end: NaiveDate) -> ApiResult<MarketPrices>;

    /// Account-specific prices for the day starting at `date`
    async fn user_prices(
        &self,
        date: NaiveDate,
        site_reference: Option<&str>,
    ) -> ApiResult<MarketPrices>;

    async fn month_summary(&self, site_reference: Option<&str>) -> ApiResult<MonthSummary>;

    async fn invoices(&self, site_reference: Option<&str>) -> ApiResult<Invoices>;

    /// Exchange the refresh token for a new token pair.
    ///
    /// Implementations start using the returned pair for subsequent calls.
    async fn renew_token(&self) -> ApiResult<AuthTokens>;
}

#[async_trait]
impl<T: FrankEnergieClient + ?Sized> FrankEnergieClient for Arc<T> {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }

    async fn prices(&self, start: NaiveDate, end: NaiveDate) -> ApiResult<MarketPrices> {
        (**self).prices(start, end).await
    }

    async fn user_prices(
        &self,
        date: NaiveDate,
        site_reference: Option<&str>,
    ) -> ApiResult<MarketPrices> {
        (**self).user_prices(date, site_reference).await
    }

    async fn month_summary(&self, site_reference: Option<&str>) -> ApiResult<MonthSummary> {
        (**self).month_summary(site_reference).await
    }

    async fn invoices(&self, site_reference: Option<&str>) -> ApiResult<Invoices> {
        (**self).invoices(site_reference).await
    }

    async fn renew_token(&self) -> ApiResult<AuthTokens> {
        (**self).renew_token().await
    }
}
