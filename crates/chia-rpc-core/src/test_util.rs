//! Shared fixtures for `chia-rpc-core` unit tests.
//!
//! Builds node-shaped JSON responses so that tests across modules share one
//! source of truth for what the full node returns.

use serde_json::{json, Value};

// ==============================================================================
// Hash Helpers
// ==============================================================================

/// A deterministic `0x`-prefixed 32-byte hash derived from `n`.
/// Useful wherever a header hash or puzzle hash only needs to be unique.
pub fn header_hash_for(n: u32) -> String {
    format!("0x{n:064x}")
}

// ==============================================================================
// Full Node Responses
// ==============================================================================

/// A `get_blockchain_state` response whose peak sits at `height`.
pub fn blockchain_state(height: u32) -> Value {
    json!({
        "blockchain_state": {
            "peak": {
                "height": height,
                "header_hash": header_hash_for(height),
            },
            "sync": { "synced": true, "sync_mode": false },
        },
        "success": true,
    })
}

/// A `get_block_record*` response for the block at `height`.
pub fn block_record(height: u32) -> Value {
    json!({
        "block_record": {
            "height": height,
            "header_hash": header_hash_for(height),
        },
        "success": true,
    })
}
