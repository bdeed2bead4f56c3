pub mod rpc;
mod shared;
pub mod streaming;

use crate::error::DecodeError;
use crate::model::Transaction;
use serde_json::Value;

/// Structural probe: streaming envelopes nest a second `transaction` object
/// inside the top-level `transaction` field; RPC replies don't.
fn looks_like_streaming(tx: &Value) -> bool {
    tx.get("transaction")
        .and_then(|t| t.get("transaction"))
        .is_some()
}

/// Normalizes either an RPC-style or a streaming-feed-style transaction into
/// the canonical shape, auto-detecting which adapter applies.
pub fn normalize(tx: &Value) -> Result<Transaction, DecodeError> {
    if looks_like_streaming(tx) {
        streaming::normalize(tx)
    } else {
        rpc::normalize(tx)
    }
}
