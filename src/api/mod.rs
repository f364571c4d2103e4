//! DexScreener API client and response types.

mod dex_client;
mod types;

pub use dex_client::{pairs_from_json, DexScreenerClient, DEXSCREENER_API_BASE};
