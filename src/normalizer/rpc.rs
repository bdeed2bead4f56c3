//! RPC-JSON adapter (spec §4.C): `{ slot, blockTime, transaction: {
//! signatures, message }, meta }`. Addresses are already base-58.

use super::shared;
use crate::error::DecodeError;
use crate::model::{AddressTableLookup, LoadedAddresses, Message, Meta, Transaction};
use serde_json::Value;

pub fn normalize(tx: &Value) -> Result<Transaction, DecodeError> {
    let transaction = tx
        .get("transaction")
        .ok_or(DecodeError::UnsupportedEncoding)?;
    let message = transaction
        .get("message")
        .ok_or(DecodeError::UnsupportedEncoding)?;
    let meta = tx.get("meta").ok_or(DecodeError::UnsupportedEncoding)?;

    let signatures: Vec<String> = transaction["signatures"]
        .as_array()
        .ok_or(DecodeError::UnsupportedEncoding)?
        .iter()
        .filter_map(|s| s.as_str().map(str::to_string))
        .collect();

    let account_keys: Vec<String> = message["accountKeys"]
        .as_array()
        .ok_or(DecodeError::UnsupportedEncoding)?
        .iter()
        .filter_map(|s| s.as_str().map(str::to_string))
        .collect();

    let address_table_lookups: Vec<AddressTableLookup> = message["addressTableLookups"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .map(|lu| {
                    shared::address_lookup(
                        lu["accountKey"].as_str().unwrap_or_default().to_string(),
                        lu,
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let instructions = message["instructions"]
        .as_array()
        .map(|arr| arr.iter().map(shared::instruction).collect())
        .unwrap_or_default();

    let pre_token_balances = meta["preTokenBalances"]
        .as_array()
        .map(|arr| arr.iter().map(shared::token_balance).collect())
        .unwrap_or_default();
    let post_token_balances = meta["postTokenBalances"]
        .as_array()
        .map(|arr| arr.iter().map(shared::token_balance).collect())
        .unwrap_or_default();

    let inner_instructions = meta["innerInstructions"]
        .as_array()
        .map(|arr| shared::inner_instruction_groups(arr, shared::instruction))
        .unwrap_or_default();

    let loaded_addresses = LoadedAddresses {
        writable: meta["loadedWritableAddresses"]
            .as_array()
            .map(|arr| arr.iter().filter_map(|a| a.as_str().map(str::to_string)).collect())
            .unwrap_or_default(),
        readonly: meta["loadedReadonlyAddresses"]
            .as_array()
            .map(|arr| arr.iter().filter_map(|a| a.as_str().map(str::to_string)).collect())
            .unwrap_or_default(),
    };

    Ok(Transaction {
        slot: tx["slot"].as_u64().unwrap_or(0),
        block_time: tx["blockTime"].as_u64(),
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
            fee: meta["fee"].as_u64().unwrap_or(0),
            pre_balances: shared::as_u64_vec(&meta["preBalances"]),
            post_balances: shared::as_u64_vec(&meta["postBalances"]),
            pre_token_balances,
            post_token_balances,
            inner_instructions,
            log_messages: meta["logMessages"]
                .as_array()
                .map(|arr| arr.iter().filter_map(|l| l.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
            err: meta.get("err").cloned().filter(|v| !v.is_null()),
            status: meta.get("status").cloned().unwrap_or(serde_json::json!({"Ok": null})),
            compute_units_consumed: meta["computeUnitsConsumed"].as_u64(),
        },
        loaded_addresses,
    })
}
