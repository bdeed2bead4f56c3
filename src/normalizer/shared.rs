//! Conversion helpers shared by the RPC and streaming-feed adapters. Kept
//! separate so both adapters stay symmetric and only diverge where the wire
//! shapes actually differ (address encoding, envelope nesting).

use crate::model::{AddressTableLookup, Instruction, TokenBalance, UiTokenAmount};
use serde_json::Value;

fn as_u64(v: &Value) -> u64 {
    v.as_u64().unwrap_or(0)
}

fn as_u8_vec(v: &Value) -> Vec<u8> {
    v.as_array()
        .map(|arr| arr.iter().filter_map(|x| x.as_u64()).map(|x| x as u8).collect())
        .unwrap_or_default()
}

/// Top-level (and RPC-style inner) instruction: `accounts` is always a plain
/// array of account-list indices here.
pub fn instruction(v: &Value) -> Instruction {
    Instruction {
        program_id_index: v["programIdIndex"].as_u64().unwrap_or(0) as u8,
        accounts: as_u8_vec(&v["accounts"]),
        data: v["data"].as_str().unwrap_or_default().to_string(),
        stack_height: v["stackHeight"].as_u64().map(|h| h as u32),
    }
}

/// Streaming-feed inner instruction: `accounts` arrives as a base64-encoded
/// byte string and must be decoded before storage (spec §4.C).
pub fn inner_instruction_streaming(v: &Value) -> Instruction {
    let accounts = match v["accounts"].as_str() {
        Some(b64) => base64::decode(b64).unwrap_or_default(),
        None => as_u8_vec(&v["accounts"]),
    };
    Instruction {
        program_id_index: v["programIdIndex"].as_u64().unwrap_or(0) as u8,
        accounts,
        data: v["data"].as_str().unwrap_or_default().to_string(),
        stack_height: v["stackHeight"].as_u64().map(|h| h as u32),
    }
}

/// Address-table lookup, addresses already resolved to base58 by the caller.
pub fn address_lookup(account_key: String, v: &Value) -> AddressTableLookup {
    AddressTableLookup {
        account_key,
        writable_indexes: as_u8_vec(&v["writableIndexes"]),
        readonly_indexes: as_u8_vec(&v["readonlyIndexes"]),
    }
}

/// TokenBalance, tolerant of a missing `uiAmount` (spec §4.C).
pub fn token_balance(v: &Value) -> TokenBalance {
    let ui = &v["uiTokenAmount"];
    TokenBalance {
        account_index: v["accountIndex"].as_u64().unwrap_or(0) as u32,
        mint: v["mint"].as_str().unwrap_or_default().to_string(),
        owner: v["owner"].as_str().map(str::to_string),
        program_id: v["programId"].as_str().map(str::to_string),
        ui_token_amount: UiTokenAmount {
            amount: ui["amount"].as_str().unwrap_or("0").to_string(),
            decimals: ui["decimals"].as_u64().unwrap_or(0) as u8,
            ui_amount: ui["uiAmount"].as_f64(),
            ui_amount_string: ui["uiAmountString"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
        },
    }
}

pub fn inner_instruction_groups(
    raw_groups: &[Value],
    instr_fn: impl Fn(&Value) -> Instruction,
) -> Vec<crate::model::InnerInstructionGroup> {
    raw_groups
        .iter()
        .map(|group| crate::model::InnerInstructionGroup {
            index: group["index"].as_u64().unwrap_or(0) as u32,
            instructions: group["instructions"]
                .as_array()
                .map(|arr| arr.iter().map(&instr_fn).collect())
                .unwrap_or_default(),
        })
        .collect()
}

pub fn as_u64_vec(v: &Value) -> Vec<u64> {
    v.as_array()
        .map(|arr| arr.iter().map(as_u64).collect())
        .unwrap_or_default()
}
