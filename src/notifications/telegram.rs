//! Telegram notification service
//!
//! Sends messages via the Telegram Bot API in HTML parse mode.

use super::{NotificationMessage, NotificationService};
use crate::config::TelegramConfig;
use std::time::Duration;

/// Telegram notification service
pub struct TelegramNotifier {
    /// Bot token
    bot_token: String,
    /// Chat ID
    chat_id: String,
    /// Bot API base URL
    api_base: String,
    /// HTTP client
    client: reqwest::Client,
    /// Whether enabled
    enabled: bool,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    pub fn new(config: &TelegramConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
            enabled: config.enabled,
        })
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    fn payload(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        })
    }
}

#[async_trait::async_trait]
impl NotificationService for TelegramNotifier {
    async fn send(&self, message: &NotificationMessage) -> anyhow::Result<()> {
        let response = self
            .client
            .post(self.send_url())
            .json(&self.payload(message.as_str()))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram API error: {} - {}", status, body);
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        if body.get("ok").and_then(|ok| ok.as_bool()) == Some(false) {
            anyhow::bail!(
                "Telegram API rejected message: {}",
                body.get("description")
                    .and_then(|d| d.as_str())
                    .unwrap_or("no description")
            );
        }

        tracing::info!(chat_id = %self.chat_id, "Sent Telegram notification");

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled && !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
