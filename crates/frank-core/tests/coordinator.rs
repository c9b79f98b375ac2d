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

//! Behaviour of the refresh coordinator against a scripted API client.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use frank_api::{ApiError, ApiResult, FrankEnergieClient};
use frank_core::{ConfigEntry, ConfigEntryStore, FrankEnergieCoordinator, MemoryStore, UpdateError};
use frank_types::constants::{CONF_ACCESS_TOKEN, CONF_SITE_REFERENCE, CONF_TOKEN};
use frank_types::{AuthTokens, Invoices, MarketPrices, MonthSummary, Price, PriceSeries};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

const PUBLIC_ELECTRICITY: f64 = 0.30;
const PUBLIC_GAS: f64 = 1.10;
const USER_ELECTRICITY: f64 = 0.25;
const USER_GAS: f64 = 1.00;

/// Hourly prices for one UTC day, all at the same market price
fn day_series(date: NaiveDate, market_price: f64) -> PriceSeries {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    (0..24)
        .map(|hour| {
            let from = midnight + Duration::hours(hour);
            Price {
                from,
                till: from + Duration::hours(1),
                market_price,
                market_price_tax: 0.0,
                sourcing_markup_price: 0.0,
                energy_tax_price: 0.0,
            }
        })
        .collect()
}

fn summary() -> MonthSummary {
    MonthSummary {
        actual_costs_until_last_meter_reading_date: 40.0,
        expected_costs_until_last_meter_reading_date: 42.0,
        expected_costs: 95.0,
        last_meter_reading_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
    }
}

#[derive(Default)]
struct ScriptedClient {
    authenticated: bool,
    user_electricity_empty: bool,
    user_gas_empty: bool,
    /// Returned once by the next call whose description starts with the prefix
    failure: Mutex<Option<(&'static str, ApiError)>>,
    renew_result: Mutex<Option<ApiResult<AuthTokens>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn public() -> Self {
        Self::default()
    }

    fn authenticated() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    fn fail_next(&self, err: ApiError) {
        self.fail_on("", err);
    }

    fn fail_on(&self, prefix: &'static str, err: ApiError) {
        *self.failure.lock() = Some((prefix, err));
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) -> ApiResult<()> {
        let mut failure = self.failure.lock();
        let matches = failure
            .as_ref()
            .is_some_and(|(prefix, _)| call.starts_with(*prefix));
        self.calls.lock().push(call);

        match failure.take() {
            Some((_, err)) if matches => Err(err),
            pending => {
                *failure = pending;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl FrankEnergieClient for ScriptedClient {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn prices(&self, start: NaiveDate, end: NaiveDate) -> ApiResult<MarketPrices> {
        self.record(format!("prices {start} {end}"))?;
        Ok(MarketPrices::new(
            day_series(start, PUBLIC_ELECTRICITY),
            day_series(start, PUBLIC_GAS),
        ))
    }

    async fn user_prices(
        &self,
        date: NaiveDate,
        site_reference: Option<&str>,
    ) -> ApiResult<MarketPrices> {
        self.record(format!("user_prices {date} {}", site_reference.unwrap_or("-")))?;
        let electricity = if self.user_electricity_empty {
            PriceSeries::default()
        } else {
            day_series(date, USER_ELECTRICITY)
        };
        let gas = if self.user_gas_empty {
            PriceSeries::default()
        } else {
            day_series(date, USER_GAS)
        };
        Ok(MarketPrices::new(electricity, gas))
    }

    async fn month_summary(&self, site_reference: Option<&str>) -> ApiResult<MonthSummary> {
        self.record(format!("month_summary {}", site_reference.unwrap_or("-")))?;
        Ok(summary())
    }

    async fn invoices(&self, site_reference: Option<&str>) -> ApiResult<Invoices> {
        self.record(format!("invoices {}", site_reference.unwrap_or("-")))?;
        Ok(Invoices::default())
    }

    async fn renew_token(&self) -> ApiResult<AuthTokens> {
        self.calls.lock().push("renew_token".to_string());
        self.renew_result
            .lock()
            .take()
            .unwrap_or_else(|| Ok(AuthTokens::new("renewed-access", "renewed-refresh")))
    }
}

fn store() -> Arc<MemoryStore> {
    let mut entry = ConfigEntry::default();
    for (key, value) in [
        (CONF_ACCESS_TOKEN, "old-access"),
        (CONF_TOKEN, "old-refresh"),
        (CONF_SITE_REFERENCE, "site-1"),
    ] {
        entry
            .data
            .insert(key.to_string(), Value::String(value.to_string()));
    }
    Arc::new(MemoryStore::new(entry))
}

fn coordinator(
    client: &Arc<ScriptedClient>,
    store: &Arc<MemoryStore>,
) -> FrankEnergieCoordinator<Arc<ScriptedClient>> {
    let store: Arc<dyn ConfigEntryStore> = store.clone();
    FrankEnergieCoordinator::new(Arc::clone(client), store)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
}

fn market_prices(series: &PriceSeries) -> Vec<f64> {
    let mut prices: Vec<f64> = series.all().iter().map(|p| p.market_price).collect();
    prices.dedup();
    prices
}

#[tokio::test]
async fn test_unauthenticated_cycle_uses_public_prices_only() {
    let client = Arc::new(ScriptedClient::public());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let snapshot = coordinator.refresh_at(now()).await.unwrap();

    assert_eq!(
        client.calls(),
        vec!["prices 2024-01-01 2024-01-02", "prices 2024-01-02 2024-01-03"]
    );
    assert!(snapshot.month_summary.is_none());
    assert!(snapshot.invoices.is_none());
}

#[tokio::test]
async fn test_series_span_both_days_in_order() {
    let client = Arc::new(ScriptedClient::public());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let snapshot = coordinator.refresh_at(now()).await.unwrap();

    let electricity = snapshot.electricity.all();
    assert_eq!(electricity.len(), 48);
    assert_eq!(
        electricity.first().unwrap().from,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(
        electricity.last().unwrap().from,
        Utc.with_ymd_and_hms(2024, 1, 2, 23, 0, 0).unwrap()
    );
    assert!(electricity.windows(2).all(|w| w[0].from < w[1].from));
    assert_eq!(snapshot.gas.len(), 48);
}

#[tokio::test]
async fn test_authenticated_cycle_with_complete_user_prices() {
    let client = Arc::new(ScriptedClient::authenticated());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let snapshot = coordinator.refresh_at(now()).await.unwrap();

    assert_eq!(
        client.calls(),
        vec![
            "user_prices 2024-01-01 site-1",
            "user_prices 2024-01-02 site-1",
            "month_summary site-1",
            "invoices site-1",
        ]
    );
    assert_eq!(market_prices(&snapshot.electricity), vec![USER_ELECTRICITY]);
    assert_eq!(market_prices(&snapshot.gas), vec![USER_GAS]);
    assert_eq!(snapshot.month_summary, Some(summary()));
    assert_eq!(snapshot.invoices, Some(Invoices::default()));
}

#[tokio::test]
async fn test_fallback_replaces_only_missing_electricity() {
    let client = Arc::new(ScriptedClient {
        authenticated: true,
        user_electricity_empty: true,
        ..ScriptedClient::default()
    });
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let snapshot = coordinator.refresh_at(now()).await.unwrap();

    assert_eq!(market_prices(&snapshot.electricity), vec![PUBLIC_ELECTRICITY]);
    assert_eq!(market_prices(&snapshot.gas), vec![USER_GAS]);
    assert!(client.calls().contains(&"prices 2024-01-01 2024-01-02".to_string()));
}

#[tokio::test]
async fn test_fallback_replaces_only_missing_gas() {
    let client = Arc::new(ScriptedClient {
        authenticated: true,
        user_gas_empty: true,
        ..ScriptedClient::default()
    });
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let snapshot = coordinator.refresh_at(now()).await.unwrap();

    assert_eq!(market_prices(&snapshot.electricity), vec![USER_ELECTRICITY]);
    assert_eq!(market_prices(&snapshot.gas), vec![PUBLIC_GAS]);
}

#[tokio::test]
async fn test_fallback_replaces_both_when_user_prices_empty() {
    let client = Arc::new(ScriptedClient {
        authenticated: true,
        user_electricity_empty: true,
        user_gas_empty: true,
        ..ScriptedClient::default()
    });
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let snapshot = coordinator.refresh_at(now()).await.unwrap();

    assert_eq!(market_prices(&snapshot.electricity), vec![PUBLIC_ELECTRICITY]);
    assert_eq!(market_prices(&snapshot.gas), vec![PUBLIC_GAS]);
    assert_eq!(snapshot.electricity.len(), 48);
}

#[tokio::test]
async fn test_transient_failure_serves_previous_snapshot() {
    let client = Arc::new(ScriptedClient::authenticated());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let first = coordinator.refresh_at(now()).await.unwrap();

    client.fail_next(ApiError::Transient("connection reset".to_string()));
    let second = coordinator
        .refresh_at(now() + Duration::hours(1))
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &coordinator.data().unwrap()));
}

#[tokio::test]
async fn test_transient_failure_during_account_fetch_serves_previous_snapshot() {
    let client = Arc::new(ScriptedClient::authenticated());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let first = coordinator.refresh_at(now()).await.unwrap();

    client.fail_on("month_summary", ApiError::Transient("timeout".to_string()));
    let second = coordinator.refresh_at(now()).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    // The cycle stops at the failing call
    let calls = client.calls();
    assert_eq!(calls.len(), 7);
    assert_eq!(calls.last().unwrap(), "month_summary site-1");
}

#[tokio::test]
async fn test_transient_failure_without_future_data_fails() {
    let client = Arc::new(ScriptedClient::public());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    coordinator.refresh_at(now()).await.unwrap();

    // Both days have elapsed by then
    client.fail_next(ApiError::Transient("connection reset".to_string()));
    let result = coordinator.refresh_at(now() + Duration::days(3)).await;

    assert_eq!(
        result,
        Err(UpdateError::UpdateFailed("connection reset".to_string()))
    );
}

#[tokio::test]
async fn test_transient_failure_on_first_cycle_fails() {
    let client = Arc::new(ScriptedClient::public());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    client.fail_next(ApiError::Transient("dns failure".to_string()));
    let result = coordinator.refresh_at(now()).await;

    assert!(matches!(result, Err(UpdateError::UpdateFailed(_))));
    assert!(coordinator.data().is_none());
}

#[tokio::test]
async fn test_user_error_escalates_even_with_future_data() {
    let client = Arc::new(ScriptedClient::authenticated());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let first = coordinator.refresh_at(now()).await.unwrap();

    client.fail_next(ApiError::request("user-error:site-not-found"));
    let result = coordinator.refresh_at(now()).await;

    assert_eq!(
        result,
        Err(UpdateError::ReauthRequired(
            "user-error:site-not-found".to_string()
        ))
    );
    // Snapshot is kept for consumers, just not served for this cycle
    assert!(Arc::ptr_eq(&first, &coordinator.data().unwrap()));
}

#[tokio::test]
async fn test_expired_token_is_renewed_and_cycle_fails() {
    let client = Arc::new(ScriptedClient::authenticated());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    client.fail_next(ApiError::AuthExpired("user-error:auth-not-authorised".to_string()));
    let result = coordinator.refresh_at(now()).await;

    assert!(matches!(result, Err(UpdateError::UpdateFailed(_))));
    assert!(client.calls().contains(&"renew_token".to_string()));

    let entry = store.entry();
    assert_eq!(entry.access_token(), Some("renewed-access"));
    assert_eq!(entry.refresh_token(), Some("renewed-refresh"));
    assert_eq!(entry.site_reference(), Some("site-1"));

    // Next cycle goes through normally
    assert!(coordinator.refresh_at(now()).await.is_ok());
}

#[tokio::test]
async fn test_expired_token_with_stale_data_still_fails() {
    let client = Arc::new(ScriptedClient::authenticated());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    coordinator.refresh_at(now()).await.unwrap();

    client.fail_next(ApiError::AuthExpired("expired".to_string()));
    let result = coordinator.refresh_at(now()).await;

    assert_eq!(result, Err(UpdateError::UpdateFailed("expired".to_string())));
}

#[tokio::test]
async fn test_rejected_renewal_requires_reauth() {
    let client = Arc::new(ScriptedClient::authenticated());
    *client.renew_result.lock() = Some(Err(ApiError::AuthExpired(
        "user-error:auth-not-authorised".to_string(),
    )));
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    client.fail_next(ApiError::AuthExpired("expired".to_string()));
    let result = coordinator.refresh_at(now()).await;

    assert!(matches!(result, Err(UpdateError::ReauthRequired(_))));
    assert_eq!(store.entry().access_token(), Some("old-access"));
}

#[tokio::test]
async fn test_transient_renewal_failure_retries_next_cycle() {
    let client = Arc::new(ScriptedClient::authenticated());
    *client.renew_result.lock() = Some(Err(ApiError::Transient("timeout".to_string())));
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    client.fail_next(ApiError::AuthExpired("expired".to_string()));
    let result = coordinator.refresh_at(now()).await;

    assert_eq!(result, Err(UpdateError::UpdateFailed("timeout".to_string())));
    assert_eq!(store.entry().refresh_token(), Some("old-refresh"));
}

#[tokio::test]
async fn test_successful_cycle_replaces_snapshot() {
    let client = Arc::new(ScriptedClient::public());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let first = coordinator.refresh_at(now()).await.unwrap();
    let second = coordinator
        .refresh_at(now() + Duration::days(1))
        .await
        .unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(
        second.electricity.all()[0].from,
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
    );
    assert!(Arc::ptr_eq(&second, &coordinator.data().unwrap()));
}

#[tokio::test]
async fn test_site_reference_change_applies_to_next_cycle() {
    let client = Arc::new(ScriptedClient::authenticated());
    let store = Arc::new(MemoryStore::new(ConfigEntry::default()));
    let mut coordinator = coordinator(&client, &store);

    coordinator.refresh_at(now()).await.unwrap();
    assert!(client.calls().contains(&"user_prices 2024-01-01 -".to_string()));

    let mut data = serde_json::Map::new();
    data.insert(
        CONF_SITE_REFERENCE.to_string(),
        Value::String("site-1".to_string()),
    );
    store.update_entry(data).unwrap();
    client.calls.lock().clear();

    coordinator.refresh_at(now()).await.unwrap();

    assert_eq!(coordinator.site_reference().as_deref(), Some("site-1"));
    assert_eq!(
        client.calls(),
        vec![
            "user_prices 2024-01-01 site-1",
            "user_prices 2024-01-02 site-1",
            "month_summary site-1",
            "invoices site-1",
        ]
    );
}

#[tokio::test]
async fn test_rejected_public_query_does_not_start_renewal() {
    let client = Arc::new(ScriptedClient::public());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    client.fail_next(ApiError::AuthExpired("HTTP 403 Forbidden".to_string()));
    let result = coordinator.refresh_at(now()).await;

    assert_eq!(
        result,
        Err(UpdateError::UpdateFailed("HTTP 403 Forbidden".to_string()))
    );
    assert!(!client.calls().contains(&"renew_token".to_string()));
}

#[tokio::test]
async fn test_rejected_public_query_serves_previous_snapshot() {
    let client = Arc::new(ScriptedClient::public());
    let store = store();
    let mut coordinator = coordinator(&client, &store);

    let first = coordinator.refresh_at(now()).await.unwrap();
    client.fail_next(ApiError::AuthExpired("HTTP 403 Forbidden".to_string()));
    let second = coordinator.refresh_at(now()).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!client.calls().contains(&"renew_token".to_string()));
}
