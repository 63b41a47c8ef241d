/// Migration detection constants
///
/// Defaults for the `migration` config section. Values observed on mainnet
/// for pump.fun tokens graduating to Raydium.
pub mod migration {
    /// Raydium migration account that receives graduating liquidity
    pub const RAYDIUM_MIGRATION_ACCOUNT: &str = "39azUYFWPz3VHgKCf3VChUwbpURdCHRxjWVowf5jUJjg";
    /// Fixed-size LP-seeding transfer that is not a migration
    pub const LP_SEED_TRANSFER_AMOUNT: i64 = 4042;
    /// Total supply of a pump.fun token in raw units (1B tokens, 6 decimals)
    pub const TOTAL_SUPPLY: u64 = 1_000_000_000_000_000;
    /// Token allocation seeded into the Raydium pool on migration
    pub const LP_RESERVE_AMOUNT: u64 = 206_900_000_000_000;
    /// Absolute tolerance when matching a holder against the LP reserve
    pub const LP_TOLERANCE: u64 = 1_000_000;
}

/// Enrichment limits
pub mod enrichment {
    /// Number of top holders included in a notification
    pub const TOP_HOLDER_LIMIT: usize = 5;
    /// Page size for `getSignaturesForAddress` (RPC maximum)
    pub const SIGNATURE_PAGE_SIZE: usize = 1000;
    /// Page size for `getTokenAccounts` (DAS maximum)
    pub const TOKEN_ACCOUNT_PAGE_SIZE: usize = 1000;
    /// Sentinel used when token metadata is unavailable
    pub const UNKNOWN: &str = "Unknown";
}

/// External links embedded in notifications
pub mod links {
    pub const SOLSCAN_TX: &str = "https://solscan.io/tx";
    pub const SOLSCAN_ACCOUNT: &str = "https://solscan.io/account";
    pub const DEXSCREENER: &str = "https://dexscreener.com/solana";
}
