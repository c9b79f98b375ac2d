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

use crate::client::FrankEnergieClient;
use crate::errors::{ApiError, ApiResult};
use crate::queries::{
    CUSTOMER_MARKET_PRICES, CustomerMarketPricesData, GraphqlRequest, GraphqlResponse, INVOICES,
    InvoicesData, LOGIN, LoginData, MARKET_PRICES, MONTH_SUMMARY, MarketPricesData,
    MonthSummaryData, Operation, RENEW_TOKEN, RenewTokenData,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use frank_types::constants::DATA_URL;
use frank_types::{AuthTokens, Invoices, MarketPrices, MonthSummary};
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Frank Energie GraphQL endpoint
#[derive(Debug)]
pub struct FrankEnergieApi {
    base_url: String,
    client: Client,
    tokens: RwLock<Option<AuthTokens>>,
}

impl FrankEnergieApi {
    /// Client for the default endpoint
    pub fn new(tokens: Option<AuthTokens>) -> ApiResult<Self> {
        Self::with_base_url(DATA_URL, tokens)
    }

    /// Client for a custom endpoint (other country, test server)
    pub fn with_base_url(
        base_url: impl Into<String>,
        tokens: Option<AuthTokens>,
    ) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Transient(format!("Failed to build HTTP client: {e}")))?;

        let base_url = base_url.into();
        debug!("Using {} for queries", base_url);

        Ok(Self {
            base_url,
            client,
            tokens: RwLock::new(tokens),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> Option<AuthTokens> {
        self.tokens.read().clone()
    }

    pub fn set_tokens(&self, tokens: Option<AuthTokens>) {
        *self.tokens.write() = tokens;
    }

    /// Log in with account credentials and keep the issued tokens
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthTokens> {
        info!("🔑 Logging in to Frank Energie as {}", email);

        let data: LoginData = self
            .query(LOGIN, json!({ "email": email, "password": password }))
            .await?;

        self.set_tokens(Some(data.login.clone()));
        Ok(data.login)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        operation: Operation,
        variables: Value,
    ) -> ApiResult<T> {
        debug!("📡 [FRANK QUERY] {}", operation.name);

        let body = GraphqlRequest {
            query: operation.document,
            operation_name: operation.name,
            variables,
        };

        let auth_token = self.tokens.read().as_ref().map(|t| t.auth_token.clone());
        let sent_token = auth_token.is_some();
        let mut request = self.client.post(&self.base_url).json(&body);
        if let Some(token) = auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if sent_token => {
                warn!("[FRANK QUERY] {} rejected the access token", operation.name);
                return Err(ApiError::AuthExpired(format!(
                    "{} returned HTTP {}",
                    operation.name,
                    response.status()
                )));
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [FRANK QUERY] {} status {}: {}", operation.name, status, error_text);
                return Err(ApiError::Transient(format!("HTTP {status}: {error_text}")));
            }
        }

        let payload: GraphqlResponse = response.json().await?;

        if let Some(first) = payload.errors.into_iter().next() {
            debug!("[FRANK QUERY] {} returned error: {}", operation.name, first.message);
            return Err(ApiError::from_graphql_message(first.message));
        }

        let data = payload
            .data
            .filter(|data| !data.is_null())
            .ok_or_else(|| ApiError::Transient(format!("{} returned no data", operation.name)))?;

        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl FrankEnergieClient for FrankEnergieApi {
    fn is_authenticated(&self) -> bool {
        self.tokens
            .read()
            .as_ref()
            .is_some_and(|tokens| !tokens.auth_token.is_empty())
    }

    async fn prices(&self, start: NaiveDate, end: NaiveDate) -> ApiResult<MarketPrices> {
        let data: MarketPricesData = self
            .query(
                MARKET_PRICES,
                json!({ "startDate": start.to_string(), "endDate": end.to_string() }),
            )
            .await?;

        debug!(
            "Public prices {}..{}: {} electricity, {} gas",
            start,
            end,
            data.market_prices_electricity.len(),
            data.market_prices_gas.len()
        );
        Ok(MarketPrices::new(
            data.market_prices_electricity,
            data.market_prices_gas,
        ))
    }

    async fn user_prices(
        &self,
        date: NaiveDate,
        site_reference: Option<&str>,
    ) -> ApiResult<MarketPrices> {
        let data: CustomerMarketPricesData = self
            .query(
                CUSTOMER_MARKET_PRICES,
                json!({ "date": date.to_string(), "siteReference": site_reference }),
            )
            .await?;

        let prices = data.customer_market_prices;
        Ok(MarketPrices::new(prices.electricity_prices, prices.gas_prices))
    }

    async fn month_summary(&self, site_reference: Option<&str>) -> ApiResult<MonthSummary> {
        let data: MonthSummaryData = self
            .query(MONTH_SUMMARY, json!({ "siteReference": site_reference }))
            .await?;
        Ok(data.month_summary)
    }

    async fn invoices(&self, site_reference: Option<&str>) -> ApiResult<Invoices> {
        let data: InvoicesData = self
            .query(INVOICES, json!({ "siteReference": site_reference }))
            .await?;
        Ok(data.invoices)
    }

    async fn renew_token(&self) -> ApiResult<AuthTokens> {
        let current = self
            .tokens()
            .ok_or_else(|| ApiError::AuthExpired("no tokens to renew".to_string()))?;

        let data: RenewTokenData = self
            .query(
                RENEW_TOKEN,
                json!({
                    "authToken": current.auth_token,
                    "refreshToken": current.refresh_token,
                }),
            )
            .await?;

        self.set_tokens(Some(data.renew_token.clone()));
        Ok(data.renew_token)
    }
}
