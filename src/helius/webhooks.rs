//! Helius webhook subscription management
//!
//! Lists, deletes and registers the enhanced webhook that delivers
//! transactions touching the watch address to this service.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::HeliusConfig;

/// Helius webhook admin API client
pub struct HeliusWebhookClient {
    api_key: String,
    client: Client,
    base_url: String,
}

/// Registration body for `POST /webhooks`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookRegistration {
    #[serde(rename = "webhookURL")]
    pub webhook_url: String,
    #[serde(rename = "transactionTypes")]
    pub transaction_types: Vec<String>,
    #[serde(rename = "accountAddresses")]
    pub account_addresses: Vec<String>,
    #[serde(rename = "webhookType")]
    pub webhook_type: String,
    #[serde(rename = "authHeader", skip_serializing_if = "Option::is_none", default)]
    pub auth_header: Option<String>,
}

impl WebhookRegistration {
    /// Enhanced webhook for every transaction type touching `address`
    pub fn enhanced(webhook_url: &str, address: &str, auth_header: Option<String>) -> Self {
        Self {
            webhook_url: webhook_url.to_string(),
            transaction_types: vec!["ANY".to_string()],
            account_addresses: vec![address.to_string()],
            webhook_type: "enhanced".to_string(),
            auth_header,
        }
    }
}

/// Existing webhook as returned by `GET /webhooks`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSummary {
    #[serde(rename = "webhookID")]
    pub webhook_id: String,
    #[serde(rename = "webhookURL", default)]
    pub webhook_url: String,
    #[serde(rename = "accountAddresses", default)]
    pub account_addresses: Vec<String>,
}

impl HeliusWebhookClient {
    pub fn new(config: &HeliusConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key: config.api_key.clone(),
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn webhooks_url(&self, suffix: &str) -> String {
        format!("{}/webhooks{}", self.base_url, suffix)
    }

    /// List all webhooks
    pub async fn list_webhooks(&self) -> Result<Vec<WebhookSummary>> {
        let response = self
            .client
            .get(self.webhooks_url(""))
            .query(&[("api-key", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to list webhooks")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Failed to list webhooks: {}", error_text));
        }

        response
            .json()
            .await
            .context("Failed to parse webhooks response")
    }

    /// Delete a webhook
    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.webhooks_url(&format!("/{}", webhook_id)))
            .query(&[("api-key", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to delete webhook")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Failed to delete webhook: {}", error_text));
        }

        Ok(())
    }

    /// Register a webhook, returning its ID
    pub async fn create_webhook(&self, registration: &WebhookRegistration) -> Result<String> {
        let response = self
            .client
            .post(self.webhooks_url(""))
            .query(&[("api-key", self.api_key.as_str())])
            .json(registration)
            .send()
            .await
            .context("Failed to send webhook registration request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Webhook registration failed: {}",
                error_text
            ));
        }

        let created: WebhookSummary = response
            .json()
            .await
            .context("Failed to parse webhook response")?;

        Ok(created.webhook_id)
    }

    /// Replace every existing webhook with a single registration
    pub async fn replace_all(&self, registration: &WebhookRegistration) -> Result<String> {
        for webhook in self.list_webhooks().await? {
            tracing::info!(webhook_id = %webhook.webhook_id, url = %webhook.webhook_url, "Deleting webhook");
            self.delete_webhook(&webhook.webhook_id).await?;
        }

        self.create_webhook(registration).await
    }
}
