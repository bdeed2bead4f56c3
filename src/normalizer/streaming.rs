//! Streaming-feed adapter (spec §4.C): nested envelope `{ transaction: {
//! slot, transaction: { meta, transaction: { signatures, message } } } }`,
//! addresses base-64, no block time, inner-instruction `accounts` are
//! base-64-encoded byte strings. Modeled on a Geyser-style feed.

use super::shared;
use crate::codec::base64_address_to_base58;
use crate::error::DecodeError;
use crate::model::{AddressTableLookup, LoadedAddresses, Message, Meta, Transaction};
use serde_json::Value;

fn readable(raw: &str) -> Result<String, DecodeError> {
    base64_address_to_base58(raw)
}

fn readable_list(v: &Value) -> Result<Vec<String>, DecodeError> {
    v.as_array()
        .map(|arr| arr.iter().filter_map(|a| a.as_str()).map(readable).collect())
        .unwrap_or_else(|| Ok(vec![]))
}

pub fn normalize(tx: &Value) -> Result<Transaction, DecodeError> {
    let txn_container = tx.get("transaction").ok_or(DecodeError::UnsupportedEncoding)?;
    let slot = txn_container["slot"].as_u64().unwrap_or(0);
    let geyser_txn = txn_container
        .get("transaction")
        .ok_or(DecodeError::UnsupportedEncoding)?;
    let geyser_meta = geyser_txn.get("meta").ok_or(DecodeError::UnsupportedEncoding)?;
    let real_txn = geyser_txn
        .get("transaction")
        .ok_or(DecodeError::UnsupportedEncoding)?;
    let message = real_txn.get("message").ok_or(DecodeError::UnsupportedEncoding)?;

    let signatures: Vec<String> = real_txn["signatures"]
        .as_array()
        .ok_or(DecodeError::UnsupportedEncoding)?
        .iter()
        .filter_map(|s| s.as_str().map(str::to_string))
        .collect();

    let loaded_addresses = LoadedAddresses {
        writable: readable_list(&geyser_meta["loadedWritableAddresses"])?,
        readonly: readable_list(&geyser_meta["loadedReadonlyAddresses"])?,
    };

    let account_keys = readable_list(&message["accountKeys"])?;

    let instructions = message["instructions"]
        .as_array()
        .map(|arr| arr.iter().map(shared::instruction).collect())
        .unwrap_or_default();

    let address_table_lookups: Vec<AddressTableLookup> = match message["addressTableLookups"].as_array() {
        Some(arr) => arr
            .iter()
            .map(|lu| {
                let key_raw = lu["accountKey"].as_str().unwrap_or_default();
                let key = readable(key_raw)?;
                Ok(shared::address_lookup(key, lu))
            })
            .collect::<Result<Vec<_>, DecodeError>>()?,
        None => vec![],
    };

    let pre_token_balances = geyser_meta["preTokenBalances"]
        .as_array()
        .map(|arr| arr.iter().map(shared::token_balance).collect())
        .unwrap_or_default();
    let post_token_balances = geyser_meta["postTokenBalances"]
        .as_array()
        .map(|arr| arr.iter().map(shared::token_balance).collect())
        .unwrap_or_default();

    let inner_instructions = geyser_meta["innerInstructions"]
        .as_array()
        .map(|arr| shared::inner_instruction_groups(arr, shared::inner_instruction_streaming))
        .unwrap_or_default();

    Ok(Transaction {
        slot,
        block_time: None, // Geyser-style feeds don't provide blockTime.
        signatures,
        message: Message {
            account_keys,
            recent_blockhash: message["recentBlockhash"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            instructions,
            address_table_lookups,
        },
        meta: Meta {
            fee: geyser_meta["fee"].as_u64().unwrap_or(0),
            pre_balances: shared::as_u64_vec(&geyser_meta["preBalances"]),
            post_balances: shared::as_u64_vec(&geyser_meta["postBalances"]),
            pre_token_balances,
            post_token_balances,
            inner_instructions,
            log_messages: geyser_meta["logMessages"]
                .as_array()
                .map(|arr| arr.iter().filter_map(|l| l.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
            err: geyser_meta.get("err").cloned().filter(|v| !v.is_null()),
            status: geyser_meta
                .get("status")
                .cloned()
                .unwrap_or(serde_json::json!({"Ok": null})),
            compute_units_consumed: geyser_meta["computeUnitsConsumed"].as_u64(),
        },
        loaded_addresses,
    })
}
