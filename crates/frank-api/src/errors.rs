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

use thiserror::Error;

/// Prefix the API puts in front of errors caused by the account or its credentials
pub const USER_ERROR_PREFIX: &str = "user-error:";

const AUTH_EXPIRED_MESSAGES: &[&str] = &[
    "user-error:auth-not-authorised",
    "user-error:auth-required",
];

/// Failure categories a client call can end in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network, server or decoding problem; retrying later may succeed
    #[error("request failed: {0}")]
    Transient(String),

    /// The account or credentials were rejected; only the user can fix this
    #[error("user error: {0}")]
    AuthUser(String),

    /// The access token is no longer accepted and should be renewed
    #[error("authentication expired: {0}")]
    AuthExpired(String),
}

impl ApiError {
    /// Classify a failed request by its message.
    ///
    /// Messages tagged with `user-error:` are account problems, everything
    /// else is treated as transient.
    pub fn request(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.starts_with(USER_ERROR_PREFIX) {
            Self::AuthUser(message)
        } else {
            Self::Transient(message)
        }
    }

    /// Classify the first error of a GraphQL response
    pub fn from_graphql_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if AUTH_EXPIRED_MESSAGES.contains(&message.as_str()) {
            Self::AuthExpired(message)
        } else {
            Self::request(message)
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transient(msg) | Self::AuthUser(msg) | Self::AuthExpired(msg) => msg,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthUser(_) | Self::AuthExpired(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transient(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transient(format!("invalid response: {err}"))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
