//! Typed HTTP client for the bookkeeping backend
//!
//! One GET per endpoint, JSON in, validated records out. No retries: a
//! failed call fails the whole refresh and the caller shows one message.

use anyhow::Result;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::constants;
use crate::expenses::{
    validate_expense_types, validate_expenses, ExpenseLabel, ExpenseRecord, ExpenseType,
    RawExpenseRecord, RawExpenseType,
};
use crate::income::IncomeRecord;
use crate::service::{Backend, DateRange};

/// Failure of a single backend call
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// HTTP access to the bookkeeping API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<ApiClient> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(constants::USER_AGENT)
            .build()?;

        Ok(ApiClient {
            http,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(query);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: response.status(),
            });
        }

        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }
}

impl Backend for ApiClient {
    async fn income_records(&self, range: &DateRange) -> Result<Vec<IncomeRecord>, ApiError> {
        self.get_json(constants::INCOME_ENDPOINT, &range.query()).await
    }

    async fn expense_records(&self, range: &DateRange) -> Result<Vec<ExpenseRecord>, ApiError> {
        let raw: Vec<RawExpenseRecord> = self
            .get_json(constants::EXPENSES_ENDPOINT, &range.query())
            .await?;
        Ok(validate_expenses(raw))
    }

    async fn expense_types(&self) -> Result<Vec<ExpenseType>, ApiError> {
        let raw: Vec<RawExpenseType> = self
            .get_json(constants::EXPENSE_TYPES_ENDPOINT, &[])
            .await?;
        Ok(validate_expense_types(raw))
    }

    async fn expense_labels(&self) -> Result<Vec<ExpenseLabel>, ApiError> {
        self.get_json(constants::EXPENSE_LABELS_ENDPOINT, &[]).await
    }
}
