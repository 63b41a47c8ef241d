//! Helius JSON-RPC client
//!
//! Implements `MetadataSource` against the Helius mainnet RPC using the DAS
//! `getAsset` and `getTokenAccounts` methods and the standard
//! `getSignaturesForAddress` method.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::HeliusConfig;
use crate::constants::enrichment::{SIGNATURE_PAGE_SIZE, TOKEN_ACCOUNT_PAGE_SIZE, UNKNOWN};
use crate::enrichment::MetadataSource;
use crate::error::{AppError, AppResult};
use crate::models::{FirstTransaction, HolderEntry, HolderInfo, TokenMetadata};

const REQUEST_ID: &str = "migration-sentinel";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Asset {
    content: Option<AssetContent>,
}

#[derive(Debug, Deserialize)]
struct AssetContent {
    metadata: Option<AssetMetadata>,
}

#[derive(Debug, Deserialize)]
struct AssetMetadata {
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SignatureInfo {
    signature: String,
    slot: u64,
    #[serde(rename = "blockTime")]
    block_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenAccountsPage {
    #[serde(default)]
    token_accounts: Vec<TokenAccount>,
}

#[derive(Debug, Deserialize)]
struct TokenAccount {
    owner: String,
    #[serde(default)]
    amount: Value,
}

/// Helius RPC client
pub struct HeliusRpcClient {
    client: Client,
    rpc_url: String,
    api_key: String,
    max_signature_pages: usize,
    max_holder_pages: usize,
    lookup_budget: Duration,
}

impl HeliusRpcClient {
    pub fn new(config: &HeliusConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            api_key: config.api_key.clone(),
            max_signature_pages: config.max_signature_pages.max(1),
            max_holder_pages: config.max_holder_pages.max(1),
            lookup_budget: config.lookup_budget(),
        })
    }

    /// Issue one JSON-RPC call and unwrap its `result`
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> AppResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: REQUEST_ID,
            method,
            params,
        };

        let response = self
            .client
            .post(&self.rpc_url)
            .query(&[("api-key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Http(format!(
                "{} returned {}: {}",
                method, status, body
            )));
        }

        let body: RpcResponse<T> = response.json().await?;

        if let Some(err) = body.error {
            return Err(AppError::Rpc(format!(
                "{} failed ({}): {}",
                method, err.code, err.message
            )));
        }

        body.result
            .ok_or_else(|| AppError::Parse(format!("{} response has no result", method)))
    }

    async fn signatures_page(
        &self,
        mint: &str,
        before: Option<&str>,
    ) -> AppResult<Vec<SignatureInfo>> {
        let mut options = json!({ "limit": SIGNATURE_PAGE_SIZE });
        if let Some(before) = before {
            options["before"] = json!(before);
        }
        self.call("getSignaturesForAddress", json!([mint, options]))
            .await
    }

    async fn token_accounts_page(&self, mint: &str, page: usize) -> AppResult<Vec<HolderEntry>> {
        let result: TokenAccountsPage = self
            .call(
                "getTokenAccounts",
                json!({
                    "mint": mint,
                    "page": page,
                    "limit": TOKEN_ACCOUNT_PAGE_SIZE,
                    "showZeroBalance": false,
                }),
            )
            .await?;

        Ok(result
            .token_accounts
            .into_iter()
            .map(|account| HolderEntry {
                owner: account.owner,
                amount: raw_amount(&account.amount),
            })
            .collect())
    }
}

#[async_trait]
impl MetadataSource for HeliusRpcClient {
    async fn token_metadata(&self, mint: &str) -> AppResult<TokenMetadata> {
        let asset: Asset = self.call("getAsset", json!({ "id": mint })).await?;

        let metadata = asset
            .content
            .and_then(|c| c.metadata)
            .ok_or_else(|| AppError::Parse(format!("asset {} has no content metadata", mint)))?;

        Ok(TokenMetadata {
            name: non_empty_or_unknown(metadata.name),
            symbol: non_empty_or_unknown(metadata.symbol),
        })
    }

    /// Walks signature history backwards; the last entry of the last page
    /// is the oldest transaction seen.
    async fn first_transaction(&self, mint: &str) -> AppResult<Option<FirstTransaction>> {
        let deadline = Instant::now() + self.lookup_budget;
        let mut oldest: Option<SignatureInfo> = None;
        let mut stopped = false;

        for page_index in 0..self.max_signature_pages {
            if oldest.is_some() && Instant::now() >= deadline {
                tracing::warn!(
                    mint,
                    page = page_index,
                    budget_ms = self.lookup_budget.as_millis() as u64,
                    "Signature history lookup out of time, using oldest entry so far"
                );
                stopped = true;
                break;
            }

            let before = oldest.as_ref().map(|s| s.signature.as_str());
            let page = match self.signatures_page(mint, before).await {
                Ok(page) => page,
                Err(e) if oldest.is_some() => {
                    tracing::warn!(
                        mint,
                        page = page_index,
                        error = %e,
                        "Signature history truncated, using oldest entry so far"
                    );
                    stopped = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            let full_page = page.len() >= SIGNATURE_PAGE_SIZE;
            if let Some(last) = page.into_iter().last() {
                oldest = Some(last);
            }
            if !full_page {
                stopped = true;
                break;
            }
        }

        if !stopped {
            tracing::warn!(
                mint,
                pages = self.max_signature_pages,
                "Signature page cap reached, first transaction may be newer than the real one"
            );
        }

        Ok(oldest.map(|s| FirstTransaction {
            signature: s.signature,
            slot: s.slot,
            block_time: s.block_time,
        }))
    }

    async fn holder_distribution(&self, mint: &str) -> AppResult<HolderInfo> {
        let deadline = Instant::now() + self.lookup_budget;
        let mut accounts = Vec::new();
        let mut stopped = false;

        // DAS pages are 1-indexed
        for page in 1..=self.max_holder_pages {
            if page > 1 && Instant::now() >= deadline {
                tracing::warn!(
                    mint,
                    page,
                    budget_ms = self.lookup_budget.as_millis() as u64,
                    "Holder lookup out of time, using accounts fetched so far"
                );
                stopped = true;
                break;
            }

            let batch = match self.token_accounts_page(mint, page).await {
                Ok(batch) => batch,
                Err(e) if page > 1 => {
                    tracing::warn!(
                        mint,
                        page,
                        error = %e,
                        "Holder pagination truncated, using accounts fetched so far"
                    );
                    stopped = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            let full_page = batch.len() >= TOKEN_ACCOUNT_PAGE_SIZE;
            accounts.extend(batch);
            if !full_page {
                stopped = true;
                break;
            }
        }

        if !stopped {
            tracing::warn!(
                mint,
                pages = self.max_holder_pages,
                "Holder page cap reached, holder count is a lower bound"
            );
        }

        Ok(HolderInfo::from_accounts(accounts))
    }
}

fn non_empty_or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => UNKNOWN.to_string(),
    }
}

/// Token account amounts arrive as integers, but tolerate floats and strings
fn raw_amount(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}
