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

//! GraphQL documents and the response shapes they decode into.

use frank_types::{AuthTokens, Invoices, MonthSummary, PriceSeries};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named GraphQL operation
#[derive(Debug, Clone, Copy)]
pub(crate) struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub operation_name: &'a str,
    pub variables: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlError {
    pub message: String,
}

pub(crate) const MARKET_PRICES: Operation = Operation {
    name: "MarketPrices",
    document: r"query MarketPrices($startDate: Date!, $endDate: Date!) {
  marketPricesElectricity(startDate: $startDate, endDate: $endDate) {
    from till marketPrice marketPriceTax sourcingMarkupPrice energyTaxPrice
  }
  marketPricesGas(startDate: $startDate, endDate: $endDate) {
    from till marketPrice marketPriceTax sourcingMarkupPrice energyTaxPrice
  }
}",
};

// Customer prices use different component names; alias them onto the public shape
pub(crate) const CUSTOMER_MARKET_PRICES: Operation = Operation {
    name: "CustomerMarketPrices",
    document: r"query CustomerMarketPrices($date: String!, $siteReference: String!) {
  customerMarketPrices(date: $date, siteReference: $siteReference) {
    electricityPrices {
      from till marketPrice marketPriceTax
      sourcingMarkupPrice: consumptionSourcingMarkupPrice
      energyTaxPrice: energyTax
    }
    gasPrices {
      from till marketPrice marketPriceTax
      sourcingMarkupPrice: consumptionSourcingMarkupPrice
      energyTaxPrice: energyTax
    }
  }
}",
};

pub(crate) const MONTH_SUMMARY: Operation = Operation {
    name: "MonthSummary",
    document: r"query MonthSummary($siteReference: String!) {
  monthSummary(siteReference: $siteReference) {
    actualCostsUntilLastMeterReadingDate
    expectedCostsUntilLastMeterReadingDate
    expectedCosts
    lastMeterReadingDate
  }
}",
};

pub(crate) const INVOICES: Operation = Operation {
    name: "Invoices",
    document: r"query Invoices($siteReference: String!) {
  invoices(siteReference: $siteReference) {
    previousPeriodInvoice { StartDate PeriodDescription TotalAmount }
    currentPeriodInvoice { StartDate PeriodDescription TotalAmount }
    upcomingPeriodInvoice { StartDate PeriodDescription TotalAmount }
  }
}",
};

pub(crate) const RENEW_TOKEN: Operation = Operation {
    name: "RenewToken",
    document: r"mutation RenewToken($authToken: String!, $refreshToken: String!) {
  renewToken(authToken: $authToken, refreshToken: $refreshToken) {
    authToken refreshToken
  }
}",
};

pub(crate) const LOGIN: Operation = Operation {
    name: "Login",
    document: r"mutation Login($email: String!, $password: String!) {
  login(email: $email, password: $password) {
    authToken refreshToken
  }
}",
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MarketPricesData {
    pub market_prices_electricity: PriceSeries,
    pub market_prices_gas: PriceSeries,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomerMarketPricesData {
    pub customer_market_prices: CustomerPrices,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomerPrices {
    #[serde(default)]
    pub electricity_prices: PriceSeries,
    #[serde(default)]
    pub gas_prices: PriceSeries,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MonthSummaryData {
    pub month_summary: MonthSummary,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InvoicesData {
    pub invoices: Invoices,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenewTokenData {
    pub renew_token: AuthTokens,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub login: AuthTokens,
}
