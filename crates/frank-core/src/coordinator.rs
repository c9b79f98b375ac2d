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

use crate::config_entry::{ConfigEntry, ConfigEntryStore};
use crate::error::UpdateError;
use crate::scheduler::RefreshSource;
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use frank_api::{ApiError, ApiResult, FrankEnergieClient};
use frank_types::constants::UPDATE_INTERVAL;
use frank_types::{MarketPrices, RefreshSnapshot};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Date windows fetched per cycle: `[today, tomorrow)` and `[tomorrow, day after)`.
///
/// Fetched separately because gas responses only cover the first requested day.
pub fn fetch_windows(today: NaiveDate) -> Option<[(NaiveDate, NaiveDate); 2]> {
    let tomorrow = today.checked_add_days(Days::new(1))?;
    let day_after_tomorrow = today.checked_add_days(Days::new(2))?;
    Some([(today, tomorrow), (tomorrow, day_after_tomorrow)])
}

/// Fetches prices and account data and keeps the latest snapshot.
pub struct FrankEnergieCoordinator<C> {
    api: C,
    store: Arc<dyn ConfigEntryStore>,
    update_interval: Duration,
    data: Option<Arc<RefreshSnapshot>>,
}

impl<C: FrankEnergieClient> fmt::Debug for FrankEnergieCoordinator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrankEnergieCoordinator")
            .field("site_reference", &self.site_reference())
            .field("update_interval", &self.update_interval)
            .field("has_data", &self.data.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: FrankEnergieClient> FrankEnergieCoordinator<C> {
    pub fn new(api: C, store: Arc<dyn ConfigEntryStore>) -> Self {
        Self {
            api,
            store,
            update_interval: UPDATE_INTERVAL,
            data: None,
        }
    }

    pub fn with_update_interval(mut self, update_interval: Duration) -> Self {
        self.update_interval = update_interval;
        self
    }

    /// Site reference currently stored in the config entry
    pub fn site_reference(&self) -> Option<String> {
        self.store.entry().site_reference().map(str::to_string)
    }

    /// Latest snapshot, stale or fresh
    pub fn data(&self) -> Option<Arc<RefreshSnapshot>> {
        self.data.clone()
    }

    /// Run one refresh cycle as of `now`.
    ///
    /// Transient failures fall back to the previous snapshot while it still
    /// has future prices for both commodities.
    pub async fn refresh_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Arc<RefreshSnapshot>, UpdateError> {
        debug!("Fetching Frank Energie data");

        match self.fetch_snapshot(now.date_naive()).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.data = Some(Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(ApiError::Transient(msg)) => self.previous_snapshot(now, msg),
            // Nothing to renew without a login; the server refused a public query
            Err(ApiError::AuthExpired(msg)) if !self.api.is_authenticated() => {
                self.previous_snapshot(now, msg)
            }
            Err(ApiError::AuthUser(msg)) => {
                error!("Frank Energie rejected the account: {}", msg);
                Err(UpdateError::ReauthRequired(msg))
            }
            Err(ApiError::AuthExpired(msg)) => {
                debug!("Authentication tokens expired, trying to renew them ({})", msg);
                self.try_renew_token().await?;
                // Next cycle retries with the renewed tokens
                Err(UpdateError::UpdateFailed(msg))
            }
        }
    }

    fn previous_snapshot(
        &self,
        now: DateTime<Utc>,
        msg: String,
    ) -> Result<Arc<RefreshSnapshot>, UpdateError> {
        match &self.data {
            Some(previous) if previous.has_future_prices(now) => {
                warn!("Serving previous Frank Energie data: {}", msg);
                Ok(Arc::clone(previous))
            }
            _ => Err(UpdateError::UpdateFailed(msg)),
        }
    }

    async fn fetch_snapshot(&self, today: NaiveDate) -> ApiResult<RefreshSnapshot> {
        let [(today, tomorrow), (_, day_after_tomorrow)] = fetch_windows(today)
            .ok_or_else(|| ApiError::Transient(format!("date out of range: {today}")))?;

        // Re-read every cycle so a new login or site reference applies right away
        let site_reference = self.site_reference();
        let site_reference = site_reference.as_deref();

        let prices_today = self
            .fetch_prices_with_fallback(today, tomorrow, site_reference)
            .await?;
        let prices_tomorrow = self
            .fetch_prices_with_fallback(tomorrow, day_after_tomorrow, site_reference)
            .await?;

        let (month_summary, invoices) = if self.api.is_authenticated() {
            (
                Some(self.api.month_summary(site_reference).await?),
                Some(self.api.invoices(site_reference).await?),
            )
        } else {
            (None, None)
        };

        Ok(RefreshSnapshot {
            electricity: prices_today.electricity + prices_tomorrow.electricity,
            gas: prices_today.gas + prices_tomorrow.gas,
            month_summary,
            invoices,
        })
    }

    async fn fetch_prices_with_fallback(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        site_reference: Option<&str>,
    ) -> ApiResult<MarketPrices> {
        if !self.api.is_authenticated() {
            return self.api.prices(start, end).await;
        }

        let mut user_prices = self.api.user_prices(start, site_reference).await?;
        if user_prices.is_complete() {
            return Ok(user_prices);
        }

        let public_prices = self.api.prices(start, end).await?;

        if user_prices.gas.is_empty() {
            info!("No gas prices found for user, falling back to public prices");
            user_prices.gas = public_prices.gas;
        }

        if user_prices.electricity.is_empty() {
            info!("No electricity prices found for user, falling back to public prices");
            user_prices.electricity = public_prices.electricity;
        }

        Ok(user_prices)
    }

    async fn try_renew_token(&self) -> Result<(), UpdateError> {
        let tokens = match self.api.renew_token().await {
            Ok(tokens) => tokens,
            Err(err) if err.is_auth() => {
                error!("Failed to renew token: {}. Starting user reauth flow", err);
                return Err(UpdateError::ReauthRequired(err.message().to_string()));
            }
            Err(err) => {
                warn!("Token renewal did not complete: {}", err);
                return Err(UpdateError::UpdateFailed(err.message().to_string()));
            }
        };

        self.store
            .update_entry(ConfigEntry::token_data(&tokens))
            .map_err(|e| {
                error!("Failed to persist renewed tokens: {}", e);
                UpdateError::UpdateFailed(e.to_string())
            })?;

        debug!("Successfully renewed token");
        Ok(())
    }
}

#[async_trait]
impl<C: FrankEnergieClient> RefreshSource for FrankEnergieCoordinator<C> {
    type Data = RefreshSnapshot;

    fn name(&self) -> &str {
        "Frank Energie coordinator"
    }

    fn update_interval(&self) -> Duration {
        self.update_interval
    }

    async fn refresh(&mut self) -> Result<Arc<RefreshSnapshot>, UpdateError> {
        self.refresh_at(Utc::now()).await
    }
}
