//! Configuration management for Migration Sentinel
//!
//! Loads configuration from YAML/TOML files and environment variables.
//! Environment variables override file values.

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::migration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Helius RPC and webhook API configuration
    #[serde(default)]
    pub helius: HeliusConfig,
    /// Telegram delivery configuration
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Migration detection constants
    #[serde(default)]
    pub migration: MigrationConfig,
    /// Pipeline feature flags
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Inbound webhook settings
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Helius configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HeliusConfig {
    /// API key (fallback env: HELIUS_API_KEY)
    #[serde(default)]
    pub api_key: String,
    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Webhook management API base
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_helius_timeout")]
    pub timeout_ms: u64,
    /// Maximum `getSignaturesForAddress` pages walked to find the oldest signature
    #[serde(default = "default_max_signature_pages")]
    pub max_signature_pages: usize,
    /// Maximum `getTokenAccounts` pages fetched for holder distribution
    #[serde(default = "default_max_holder_pages")]
    pub max_holder_pages: usize,
    /// Wall-clock budget for one paginated lookup; paging stops once spent
    #[serde(default = "default_lookup_budget")]
    pub lookup_budget_ms: u64,
}

fn default_rpc_url() -> String {
    "https://mainnet.helius-rpc.com".to_string()
}

fn default_api_url() -> String {
    "https://api.helius.xyz/v0".to_string()
}

fn default_helius_timeout() -> u64 {
    8000
}

fn default_max_signature_pages() -> usize {
    10
}

fn default_max_holder_pages() -> usize {
    20
}

fn default_lookup_budget() -> u64 {
    30_000
}

impl HeliusConfig {
    /// Per-call HTTP timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Deadline after which page loops return what they have
    pub fn lookup_budget(&self) -> Duration {
        Duration::from_millis(self.lookup_budget_ms)
    }

    /// Outer limit for one enrichment lookup.
    ///
    /// The page loop checks its deadline before each request and a request
    /// is bounded by the per-call timeout, so a paginated lookup ends within
    /// budget plus one call.
    pub fn enrichment_timeout(&self) -> Duration {
        self.lookup_budget() + self.timeout()
    }
}

impl Default for HeliusConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            rpc_url: default_rpc_url(),
            api_url: default_api_url(),
            timeout_ms: default_helius_timeout(),
            max_signature_pages: default_max_signature_pages(),
            max_holder_pages: default_max_holder_pages(),
            lookup_budget_ms: default_lookup_budget(),
        }
    }
}

/// Telegram-specific notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Whether Telegram notifications are enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Bot token (fallback env: TELEGRAM_TOKEN)
    #[serde(default)]
    pub bot_token: String,
    /// Chat ID to send notifications to (fallback env: TELEGRAM_ID)
    #[serde(default)]
    pub chat_id: String,
    /// Bot API base URL
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_telegram_timeout")]
    pub timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_telegram_timeout() -> u64 {
    10000
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: default_telegram_api_base(),
            timeout_ms: default_telegram_timeout(),
        }
    }
}

/// Migration detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    /// Account whose incoming transfers signal a migration
    #[serde(default = "default_watch_address")]
    pub watch_address: String,
    /// Transfer amount (truncated) that is ignored
    #[serde(default = "default_excluded_amount")]
    pub excluded_amount: i64,
    /// Token total supply in raw units
    #[serde(default = "default_total_supply")]
    pub total_supply: u64,
    /// LP reserve allocation in raw units
    #[serde(default = "default_lp_reserve")]
    pub lp_reserve_amount: u64,
    /// Absolute tolerance for LP reserve matching
    #[serde(default = "default_lp_tolerance")]
    pub lp_tolerance: u64,
}

fn default_watch_address() -> String {
    migration::RAYDIUM_MIGRATION_ACCOUNT.to_string()
}

fn default_excluded_amount() -> i64 {
    migration::LP_SEED_TRANSFER_AMOUNT
}

fn default_total_supply() -> u64 {
    migration::TOTAL_SUPPLY
}

fn default_lp_reserve() -> u64 {
    migration::LP_RESERVE_AMOUNT
}

fn default_lp_tolerance() -> u64 {
    migration::LP_TOLERANCE
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            watch_address: default_watch_address(),
            excluded_amount: default_excluded_amount(),
            total_supply: default_total_supply(),
            lp_reserve_amount: default_lp_reserve(),
            lp_tolerance: default_lp_tolerance(),
        }
    }
}

/// Pipeline feature flags
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Fetch first-transaction data and include "time to bond"
    #[serde(default = "default_true")]
    pub time_to_bond: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { time_to_bond: true }
    }
}

/// Inbound webhook configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfig {
    /// Expected Authorization header value; open endpoint when unset
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Public URL registered with Helius by `sync_webhooks`
    #[serde(default)]
    pub public_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SENTINEL_*)
    /// 2. config/config.{yaml,toml} (if exists)
    /// 3. config.{yaml,toml} (if exists)
    /// 4. Legacy variables (HELIUS_API_KEY, TELEGRAM_TOKEN, TELEGRAM_ID, PORT)
    /// 5. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config/config").required(false))
            // SENTINEL_SERVER__PORT=8081 -> server.port = 8081
            .add_source(
                Environment::with_prefix("SENTINEL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a single file, ignoring the environment
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder = Config::builder();

        for (key, var) in [
            ("helius.api_key", "HELIUS_API_KEY"),
            ("telegram.bot_token", "TELEGRAM_TOKEN"),
            ("telegram.chat_id", "TELEGRAM_ID"),
            ("server.port", "PORT"),
        ] {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    builder = builder.set_default(key, value)?;
                }
            }
        }

        Ok(builder)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Pubkey::from_str(&self.migration.watch_address).is_err() {
            return Err(ConfigError::Message(format!(
                "migration.watch_address is not a valid Solana address: {}",
                self.migration.watch_address
            )));
        }

        if self.migration.total_supply == 0 {
            return Err(ConfigError::Message(
                "migration.total_supply must be non-zero".to_string(),
            ));
        }

        if self.helius.api_key.is_empty() {
            tracing::warn!("Helius API key not set, enrichment will fall back to defaults");
        }

        if self.telegram.enabled
            && (self.telegram.bot_token.is_empty() || self.telegram.chat_id.is_empty())
        {
            tracing::warn!("Telegram bot token or chat id not set, notifications disabled");
        }

        Ok(())
    }
}
