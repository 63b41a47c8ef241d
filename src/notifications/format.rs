//! Migration alert formatting
//!
//! Pure functions only: everything needed to render a message is passed in,
//! including the current time.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use super::NotificationMessage;
use crate::config::{MigrationConfig, PipelineConfig};
use crate::constants::{enrichment::UNKNOWN, links, migration};
use crate::models::{FirstTransaction, HolderInfo, TokenInfo, TokenTransfer};

/// Constants that shape the rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSettings {
    pub total_supply: u64,
    pub lp_reserve_amount: u64,
    pub lp_tolerance: u64,
    /// Include the "Time to bond" line
    pub time_to_bond: bool,
}

impl FormatSettings {
    pub fn from_config(migration: &MigrationConfig, pipeline: &PipelineConfig) -> Self {
        Self {
            total_supply: migration.total_supply,
            lp_reserve_amount: migration.lp_reserve_amount,
            lp_tolerance: migration.lp_tolerance,
            time_to_bond: pipeline.time_to_bond,
        }
    }

    /// Whether a balance is the recycled LP reserve
    pub fn is_lp_reserve(&self, amount: u64) -> bool {
        amount.abs_diff(self.lp_reserve_amount) < self.lp_tolerance
    }
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            total_supply: migration::TOTAL_SUPPLY,
            lp_reserve_amount: migration::LP_RESERVE_AMOUNT,
            lp_tolerance: migration::LP_TOLERANCE,
            time_to_bond: true,
        }
    }
}

/// Everything known about one detected migration
#[derive(Debug, Clone, Copy)]
pub struct MigrationAlert<'a> {
    pub signature: &'a str,
    pub transfer: &'a TokenTransfer,
    pub token: &'a TokenInfo,
    pub holders: &'a HolderInfo,
}

/// Render a migration alert as Telegram HTML
pub fn format_migration(
    alert: &MigrationAlert<'_>,
    now: DateTime<Utc>,
    settings: &FormatSettings,
) -> NotificationMessage {
    let mint = &alert.transfer.mint;
    let mut text = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(text, "🚀 <b>New Token Migration to Raydium</b>");
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "<b>Token:</b> {} ({})",
        escape_html(&alert.token.name),
        escape_html(&alert.token.symbol)
    );
    let _ = writeln!(text, "<b>Mint:</b> <code>{}</code>", mint);
    let _ = writeln!(
        text,
        "<b>Migrated:</b> {} tokens",
        format_thousands(alert.transfer.whole_amount().max(0) as u64)
    );
    if settings.time_to_bond {
        let _ = writeln!(
            text,
            "<b>Time to bond:</b> {}",
            time_to_bond(alert.token.first_transaction.as_ref(), now)
        );
    }
    let _ = writeln!(text, "<b>Holders:</b> {}", alert.holders.total_holders);
    let _ = writeln!(text);
    let _ = writeln!(text, "<b>Top {} Holders:</b>", alert.holders.top_holders.len());

    if alert.holders.top_holders.is_empty() {
        let _ = writeln!(text, "No holder data");
    }

    for (index, holder) in alert.holders.top_holders.iter().enumerate() {
        let marker = if settings.is_lp_reserve(holder.amount) {
            "♻️ LP".to_string()
        } else {
            format!("{}.", index + 1)
        };

        let _ = writeln!(
            text,
            "{} <a href='{}/{}'>{}</a>: {} ({:.2}%)",
            marker,
            links::SOLSCAN_ACCOUNT,
            holder.owner,
            shorten_address(&holder.owner),
            format_thousands(holder.amount),
            supply_percentage(holder.amount, settings.total_supply)
        );
    }

    let _ = writeln!(text);
    let _ = write!(
        text,
        "<a href='{}/{}'>View Transaction</a> | <a href='{}/{}'>Trade</a>",
        links::SOLSCAN_TX,
        alert.signature,
        links::DEXSCREENER,
        mint
    );

    NotificationMessage::new(text)
}

/// Share of total supply, in percent.
///
/// A full-supply holder may overshoot 100.0 by float rounding.
pub fn supply_percentage(amount: u64, total_supply: u64) -> f64 {
    if total_supply == 0 {
        return 0.0;
    }
    amount as f64 / total_supply as f64 * 100.0
}

/// Elapsed time from the first transaction to `now`
pub fn time_to_bond(first: Option<&FirstTransaction>, now: DateTime<Utc>) -> String {
    match first.and_then(|f| f.block_time) {
        Some(block_time) => format_elapsed(now.timestamp() - block_time),
        None => UNKNOWN.to_string(),
    }
}

/// First two non-zero units among days, hours and minutes
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let units = [
        (seconds / 86_400, "d"),
        (seconds % 86_400 / 3_600, "h"),
        (seconds % 3_600 / 60, "m"),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(value, _)| *value > 0)
        .take(2)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}

/// `ABCD...WXYZ` form of an address
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Group digits with commas
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
