use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::PaystackConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializeTransaction {
    pub email: String,
    /// Minor currency units (kobo).
    pub amount: i64,
    pub callback_url: String,
}

/// Remote payment processor reached during checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Returns the checkout page URL the customer is sent to.
    async fn initialize(&self, request: &InitializeTransaction) -> AppResult<String>;

    /// True only when the gateway reports the transaction as successful.
    async fn verify(&self, reference: &str) -> AppResult<bool>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Authorization {
    authorization_url: String,
}

#[derive(Debug, Deserialize)]
struct Verification {
    status: String,
}

pub struct PaystackClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(config: &PaystackConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }
}

fn authorization_url(body: &str) -> Option<String> {
    let envelope: Envelope<Authorization> = serde_json::from_str(body).ok()?;
    if !envelope.status {
        log::warn!(
            "Gateway refused initialization: {}",
            envelope.message.unwrap_or_default()
        );
        return None;
    }
    envelope.data.map(|data| data.authorization_url)
}

fn verified(body: &str) -> Option<bool> {
    let envelope: Envelope<Verification> = serde_json::from_str(body).ok()?;
    Some(envelope.status && envelope.data.is_some_and(|data| data.status == "success"))
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, request: &InitializeTransaction) -> AppResult<String> {
        let failed = || AppError::Gateway("Payment initialization failed. Try again.".to_string());

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gateway unreachable during initialize: {e}");
                failed()
            })?;

        let body = response.text().await.map_err(|e| {
            log::error!("Failed to read gateway initialize response: {e}");
            failed()
        })?;

        authorization_url(&body).ok_or_else(failed)
    }

    async fn verify(&self, reference: &str) -> AppResult<bool> {
        let failed = || AppError::Gateway("Could not verify payment. Try again.".to_string());

        let response = self
            .client
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gateway unreachable during verify: {e}");
                failed()
            })?;

        let body = response.text().await.map_err(|e| {
            log::error!("Failed to read gateway verify response: {e}");
            failed()
        })?;

        verified(&body).ok_or_else(|| {
            log::error!("Malformed gateway verify response");
            failed()
        })
    }
}
