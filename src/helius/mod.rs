//! Helius integration
//!
//! - `rpc`: JSON-RPC metadata lookups used for enrichment
//! - `webhooks`: webhook subscription management

mod rpc;
mod webhooks;

pub use rpc::HeliusRpcClient;
pub use webhooks::{HeliusWebhookClient, WebhookRegistration, WebhookSummary};
