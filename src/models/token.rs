//! Token enrichment models

use serde::{Deserialize, Serialize};

use crate::constants::enrichment::{TOP_HOLDER_LIMIT, UNKNOWN};

/// Display identity of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            symbol: UNKNOWN.to_string(),
        }
    }
}

/// Oldest known transaction for a mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstTransaction {
    pub signature: String,
    pub slot: u64,
    /// Unix timestamp in seconds, absent for very old or pruned slots
    pub block_time: Option<i64>,
}

/// Token identity plus optional creation data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub first_transaction: Option<FirstTransaction>,
}

impl TokenInfo {
    /// Token info with "Unknown" name and symbol
    pub fn unknown(mint: &str) -> Self {
        Self::from_parts(mint, TokenMetadata::default(), None)
    }

    pub fn from_parts(
        mint: &str,
        metadata: TokenMetadata,
        first_transaction: Option<FirstTransaction>,
    ) -> Self {
        Self {
            mint: mint.to_string(),
            name: metadata.name,
            symbol: metadata.symbol,
            first_transaction,
        }
    }
}

/// A token account balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderEntry {
    pub owner: String,
    /// Raw units (not adjusted for decimals)
    pub amount: u64,
}

/// Holder distribution for a mint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HolderInfo {
    /// Number of non-zero token accounts
    pub total_holders: usize,
    /// Largest holders, descending by amount, at most five
    pub top_holders: Vec<HolderEntry>,
}

impl HolderInfo {
    /// Build from an unordered account list.
    ///
    /// Zero balances are dropped; the sort is stable so equal balances keep
    /// their RPC order.
    pub fn from_accounts(mut accounts: Vec<HolderEntry>) -> Self {
        accounts.retain(|a| a.amount > 0);
        accounts.sort_by(|a, b| b.amount.cmp(&a.amount));

        let total_holders = accounts.len();
        accounts.truncate(TOP_HOLDER_LIMIT);

        Self {
            total_holders,
            top_holders: accounts,
        }
    }
}
