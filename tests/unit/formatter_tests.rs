//! Migration alert formatting tests
//!
//! Tests percentage, LP marker, elapsed-time and full message rendering.

use chrono::{Duration, TimeZone, Utc};
use migration_sentinel::constants::migration::{LP_RESERVE_AMOUNT, LP_TOLERANCE, TOTAL_SUPPLY};
use migration_sentinel::models::{FirstTransaction, HolderEntry, HolderInfo, TokenInfo, TokenTransfer};
use migration_sentinel::notifications::format::{
    format_elapsed, format_migration, supply_percentage, time_to_bond, FormatSettings,
    MigrationAlert,
};

const MINT: &str = "So11111111111111111111111111111111111111112";

fn transfer(amount: f64) -> TokenTransfer {
    TokenTransfer {
        to_user_account: "39azUYFWPz3VHgKCf3VChUwbpURdCHRxjWVowf5jUJjg".to_string(),
        mint: MINT.to_string(),
        token_amount: amount,
    }
}

fn holder(owner: &str, amount: u64) -> HolderEntry {
    HolderEntry {
        owner: owner.to_string(),
        amount,
    }
}

// =============================================================================
// PERCENTAGE TESTS
// =============================================================================

#[test]
fn test_full_supply_is_one_hundred_percent() {
    let pct = supply_percentage(TOTAL_SUPPLY, TOTAL_SUPPLY);
    assert!((pct - 100.0).abs() < 1e-9, "got {}", pct);
}

#[test]
fn test_lp_reserve_share() {
    let pct = supply_percentage(LP_RESERVE_AMOUNT, TOTAL_SUPPLY);
    assert!((pct - 20.69).abs() < 1e-9, "got {}", pct);
}

#[test]
fn test_zero_supply_does_not_divide() {
    assert_eq!(supply_percentage(1_000, 0), 0.0);
}

// =============================================================================
// LP MARKER TESTS
// =============================================================================

#[test]
fn test_lp_marker_within_tolerance() {
    let settings = FormatSettings::default();

    assert!(settings.is_lp_reserve(LP_RESERVE_AMOUNT));
    assert!(settings.is_lp_reserve(LP_RESERVE_AMOUNT + LP_TOLERANCE - 1));
    assert!(settings.is_lp_reserve(LP_RESERVE_AMOUNT - LP_TOLERANCE + 1));
}

#[test]
fn test_lp_marker_outside_tolerance() {
    let settings = FormatSettings::default();

    assert!(!settings.is_lp_reserve(LP_RESERVE_AMOUNT + 2_000_000));
    assert!(!settings.is_lp_reserve(LP_RESERVE_AMOUNT - 2_000_000));
}

#[test]
fn test_lp_marker_replaces_rank() {
    let token = TokenInfo::unknown(MINT);
    let holders = HolderInfo::from_accounts(vec![
        holder("LPpoolAccount1111111111111111111111111111111", LP_RESERVE_AMOUNT + 500_000),
        holder("WhaleAccount11111111111111111111111111111111", 50_000_000_000_000),
        holder("NearLPAccount1111111111111111111111111111111", LP_RESERVE_AMOUNT + 2_000_000),
    ]);
    let t = transfer(1_000.0);
    let alert = MigrationAlert {
        signature: "sig",
        transfer: &t,
        token: &token,
        holders: &holders,
    };

    let text = format_migration(&alert, Utc::now(), &FormatSettings::default()).into_inner();

    // Sorted: near-LP (not marked) first, LP second, whale third
    assert!(text.contains("1. <a href='https://solscan.io/account/NearLPAccount"));
    assert!(text.contains("♻️ LP <a href='https://solscan.io/account/LPpoolAccount"));
    assert!(text.contains("3. <a href='https://solscan.io/account/WhaleAccount"));
    assert_eq!(text.matches("♻️ LP").count(), 1);
}

// =============================================================================
// ELAPSED TIME TESTS
// =============================================================================

#[test]
fn test_elapsed_days_and_hours() {
    let elapsed = 2 * 86_400 + 3 * 3_600 + 10 * 60;
    assert_eq!(format_elapsed(elapsed), "2d 3h");
}

#[test]
fn test_elapsed_minutes_only() {
    assert_eq!(format_elapsed(45 * 60), "45m");
}

#[test]
fn test_elapsed_hours_and_minutes() {
    assert_eq!(format_elapsed(5 * 3_600 + 12 * 60), "5h 12m");
}

#[test]
fn test_elapsed_skips_zero_units() {
    assert_eq!(format_elapsed(86_400 + 7 * 60), "1d 7m");
}

#[test]
fn test_elapsed_under_a_minute() {
    assert_eq!(format_elapsed(30), "0m");
    assert_eq!(format_elapsed(-120), "0m");
}

#[test]
fn test_time_to_bond_unknown_without_first_transaction() {
    assert_eq!(time_to_bond(None, Utc::now()), "Unknown");

    let no_block_time = FirstTransaction {
        signature: "first".to_string(),
        slot: 1,
        block_time: None,
    };
    assert_eq!(time_to_bond(Some(&no_block_time), Utc::now()), "Unknown");
}

#[test]
fn test_time_to_bond_from_block_time() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let first = FirstTransaction {
        signature: "first".to_string(),
        slot: 1,
        block_time: Some((now - Duration::minutes(45)).timestamp()),
    };

    assert_eq!(time_to_bond(Some(&first), now), "45m");
}

// =============================================================================
// MESSAGE TESTS
// =============================================================================

#[test]
fn test_message_with_unknown_enrichment() {
    let token = TokenInfo::unknown(MINT);
    let holders = HolderInfo::default();
    let t = transfer(793_100_000.0);
    let alert = MigrationAlert {
        signature: "5sigABC",
        transfer: &t,
        token: &token,
        holders: &holders,
    };

    let text = format_migration(&alert, Utc::now(), &FormatSettings::default()).into_inner();

    assert!(text.contains("<b>Token:</b> Unknown (Unknown)"));
    assert!(text.contains(&format!("<code>{}</code>", MINT)));
    assert!(text.contains("793,100,000 tokens"));
    assert!(text.contains("<b>Time to bond:</b> Unknown"));
    assert!(text.contains("<b>Holders:</b> 0"));
    assert!(text.contains("No holder data"));
    assert!(text.contains("https://solscan.io/tx/5sigABC"));
    assert!(text.contains(&format!("https://dexscreener.com/solana/{}", MINT)));
}

#[test]
fn test_message_without_time_to_bond() {
    let token = TokenInfo::unknown(MINT);
    let holders = HolderInfo::default();
    let t = transfer(1.0);
    let alert = MigrationAlert {
        signature: "sig",
        transfer: &t,
        token: &token,
        holders: &holders,
    };
    let settings = FormatSettings {
        time_to_bond: false,
        ..FormatSettings::default()
    };

    let text = format_migration(&alert, Utc::now(), &settings).into_inner();
    assert!(!text.contains("Time to bond"));
}

#[test]
fn test_message_escapes_token_name() {
    let mut token = TokenInfo::unknown(MINT);
    token.name = "<Cat & Dog>".to_string();
    token.symbol = "C&D".to_string();
    let holders = HolderInfo::default();
    let t = transfer(1.0);
    let alert = MigrationAlert {
        signature: "sig",
        transfer: &t,
        token: &token,
        holders: &holders,
    };

    let text = format_migration(&alert, Utc::now(), &FormatSettings::default()).into_inner();
    assert!(text.contains("&lt;Cat &amp; Dog&gt; (C&amp;D)"));
}

#[test]
fn test_message_lists_at_most_five_holders() {
    let token = TokenInfo::unknown(MINT);
    let accounts = (1..=8)
        .map(|i| holder(&format!("Holder{:0>38}", i), i * 1_000_000_000))
        .collect();
    let holders = HolderInfo::from_accounts(accounts);
    let t = transfer(1.0);
    let alert = MigrationAlert {
        signature: "sig",
        transfer: &t,
        token: &token,
        holders: &holders,
    };

    let text = format_migration(&alert, Utc::now(), &FormatSettings::default()).into_inner();

    assert!(text.contains("<b>Holders:</b> 8"));
    assert!(text.contains("<b>Top 5 Holders:</b>"));
    assert!(text.contains("5. <a"));
    assert!(!text.contains("6. <a"));
    assert!(text.contains("8,000,000,000 (0.00%)"));
}
