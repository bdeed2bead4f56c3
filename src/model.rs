//! Canonical, encoding-independent transaction shape produced by the normalizer
//! and consumed by every downstream component (parsers, addons, resolvers).
//!
//! Nothing here knows whether the source was an RPC reply or a streaming-feed
//! envelope — that distinction dies inside `normalizer::{rpc, streaming}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiTokenAmount {
    pub amount: String,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
    pub ui_amount_string: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub account_index: u32,
    pub mint: String,
    pub owner: Option<String>,
    pub program_id: Option<String>,
    pub ui_token_amount: UiTokenAmount,
}

// Raw instruction shape shared by both top-level and inner instructions.
// `data` is kept as the opaque wire string (base58 or base64) through
// normalization; parsers decode it on demand via `codec::decode_payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: String,
    pub stack_height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnerInstructionGroup {
    pub index: u32,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressTableLookup {
    pub account_key: String,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadedAddresses {
    pub writable: Vec<String>,
    pub readonly: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub account_keys: Vec<String>,
    pub recent_blockhash: String,
    pub instructions: Vec<Instruction>,
    pub address_table_lookups: Vec<AddressTableLookup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub fee: u64,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub pre_token_balances: Vec<TokenBalance>,
    pub post_token_balances: Vec<TokenBalance>,
    pub inner_instructions: Vec<InnerInstructionGroup>,
    pub log_messages: Vec<String>,
    pub err: Option<serde_json::Value>,
    pub status: serde_json::Value,
    pub compute_units_consumed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub slot: u64,
    pub block_time: Option<u64>,
    pub signatures: Vec<String>,
    pub message: Message,
    pub meta: Meta,
    pub loaded_addresses: LoadedAddresses,
}

/// The derived invariant from spec §3: `account_keys ++ loaded.writable ++
/// loaded.readonly`, the single address universe every `program_id_index` and
/// `accounts[i]` indexes into. Built once per `Transaction` and handed around
/// by reference so program parsers never rebuild the concatenation.
pub struct FullAccountList(Vec<String>);

impl FullAccountList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn index_of(&self, address: &str) -> Option<usize> {
        self.0.iter().position(|a| a == address)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Transaction {
    pub fn full_account_list(&self) -> FullAccountList {
        let mut all = Vec::with_capacity(
            self.message.account_keys.len()
                + self.loaded_addresses.writable.len()
                + self.loaded_addresses.readonly.len(),
        );
        all.extend(self.message.account_keys.iter().cloned());
        all.extend(self.loaded_addresses.writable.iter().cloned());
        all.extend(self.loaded_addresses.readonly.iter().cloned());
        FullAccountList(all)
    }

    pub fn signature(&self) -> &str {
        // Every event carries `tx.signatures[0]` (spec §8 property 1); a
        // transaction with no signatures is not a transaction worth decoding.
        self.signatures
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_meta() -> Meta {
        Meta {
            fee: 0,
            pre_balances: vec![],
            post_balances: vec![],
            pre_token_balances: vec![],
            post_token_balances: vec![],
            inner_instructions: vec![],
            log_messages: vec![],
            err: None,
            status: serde_json::json!({"Ok": null}),
            compute_units_consumed: None,
        }
    }

    #[test]
    fn full_account_list_concatenates_in_order() {
        let tx = Transaction {
            slot: 1,
            block_time: None,
            signatures: vec!["sig1".into()],
            message: Message {
                account_keys: vec!["a".into(), "b".into()],
                recent_blockhash: "bh".into(),
                instructions: vec![],
                address_table_lookups: vec![],
            },
            meta: empty_meta(),
            loaded_addresses: LoadedAddresses {
                writable: vec!["w1".into()],
                readonly: vec!["r1".into(), "r2".into()],
            },
        };
        let full = tx.full_account_list();
        assert_eq!(full.len(), 5);
        assert_eq!(full.get(0), Some("a"));
        assert_eq!(full.get(2), Some("w1"));
        assert_eq!(full.get(3), Some("r1"));
        assert_eq!(full.get(4), Some("r2"));
    }
}
