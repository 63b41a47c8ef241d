//! Webhook event models - Helius enhanced transaction payloads
//!
//! Only the fields the pipeline reads are modelled. Missing or null fields
//! deserialize to empty values so a partial payload becomes "no match"
//! instead of a hard error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One enhanced transaction delivered by the webhook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    /// Transaction signature
    #[serde(default, deserialize_with = "string_or_empty")]
    pub signature: String,
    /// Token transfers in instruction order
    #[serde(
        rename = "tokenTransfers",
        default,
        deserialize_with = "transfers_or_empty"
    )]
    pub token_transfers: Vec<TokenTransfer>,
}

/// A single SPL token transfer inside a transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenTransfer {
    /// Destination wallet (owner of the receiving token account)
    #[serde(rename = "toUserAccount", default, deserialize_with = "string_or_empty")]
    pub to_user_account: String,
    /// Token mint address
    #[serde(default, deserialize_with = "string_or_empty")]
    pub mint: String,
    /// UI amount, normalized from number or numeric string
    #[serde(rename = "tokenAmount", default, deserialize_with = "lenient_amount")]
    pub token_amount: f64,
}

impl TokenTransfer {
    /// Amount truncated toward zero for integer comparisons
    pub fn whole_amount(&self) -> i64 {
        self.token_amount.trunc() as i64
    }
}

/// Split a webhook body into events.
///
/// The body is either a single event object or an array of them. Elements
/// that cannot be read as an event are returned as errors so the caller can
/// treat them as malformed without dropping their siblings.
pub fn parse_events(body: Value) -> Vec<Result<TransactionEvent, serde_json::Error>> {
    match body {
        Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
        other => vec![serde_json::from_value(other)],
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}

fn transfers_or_empty<'de, D>(deserializer: D) -> Result<Vec<TokenTransfer>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<TokenTransfer>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(amount_from_value).unwrap_or(0.0))
}

/// Read a numeric amount from a JSON number or numeric string
pub(crate) fn amount_from_value(value: &Value) -> f64 {
    let amount = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };

    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}
