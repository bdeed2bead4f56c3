//! Enrichment passes over a canonical Transaction (spec §4.G), grounded on
//! `soltxs/parser/addons/platform_identifier.py` for shape and naming; the
//! other four addons have no retrieved source file and are built directly
//! from spec §4.G's description in the same style.

use crate::model::{LoadedAddresses, Transaction};
use serde::Serialize;
use std::collections::HashMap;

const PLATFORM_TABLE: &[(&str, &str)] = &[
    ("tro46jTMkb56A3wPepo5HT7JcvX9wFWvR8VaJzgdjEf", "Trojan"),
    ("9RYJ3qr5eU5xAooqVcbmdeusjcViL5Nkiq7Gske3tiKq", "BullX"),
    ("AVUCZyuT35YSuj4RH7fwiyPu82Djn2Hfg7y2ND2XcnZH", "Photon"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenTransferDelta {
    pub mint: String,
    pub owner: String,
    pub pre: i128,
    pub post: i128,
    pub delta: i128,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Addons {
    pub compute_units_consumed: Option<u64>,
    pub instruction_count: usize,
    pub loaded_addresses: LoadedAddresses,
    pub platform: Option<(String, String)>,
    pub token_transfer_summary: Vec<TokenTransferDelta>,
}

fn compute_units(tx: &Transaction) -> Option<u64> {
    tx.meta.compute_units_consumed
}

/// Top-level instructions plus every inner-instruction group's size.
fn instruction_count(tx: &Transaction) -> usize {
    tx.message.instructions.len()
        + tx.meta
            .inner_instructions
            .iter()
            .map(|g| g.instructions.len())
            .sum::<usize>()
}

fn platform_identifier(tx: &Transaction) -> Option<(String, String)> {
    let full = tx.full_account_list();
    for address in full.as_slice() {
        if let Some((_, name)) = PLATFORM_TABLE.iter().find(|(known, _)| known == address) {
            return Some((address.clone(), name.to_string()));
        }
    }
    None
}

/// Aggregates pre/post/delta per (mint, owner) token balance across the
/// whole transaction, combining pre/post token balances by account index.
fn token_transfer_summary(tx: &Transaction) -> Vec<TokenTransferDelta> {
    let mut pre: HashMap<(String, String), (i128, u8)> = HashMap::new();
    let mut post: HashMap<(String, String), (i128, u8)> = HashMap::new();

    for tb in &tx.meta.pre_token_balances {
        if let Ok(amount) = tb.ui_token_amount.amount.parse::<i128>() {
            let owner = tb.owner.clone().unwrap_or_default();
            pre.insert((tb.mint.clone(), owner), (amount, tb.ui_token_amount.decimals));
        }
    }
    for tb in &tx.meta.post_token_balances {
        if let Ok(amount) = tb.ui_token_amount.amount.parse::<i128>() {
            let owner = tb.owner.clone().unwrap_or_default();
            post.insert((tb.mint.clone(), owner), (amount, tb.ui_token_amount.decimals));
        }
    }

    let mut keys: Vec<(String, String)> = pre.keys().chain(post.keys()).cloned().collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .map(|(mint, owner)| {
            let (pre_amount, pre_decimals) = pre.get(&(mint.clone(), owner.clone())).copied().unwrap_or((0, 0));
            let (post_amount, post_decimals) = post.get(&(mint.clone(), owner.clone())).copied().unwrap_or((0, 0));
            let decimals = if post.contains_key(&(mint.clone(), owner.clone())) { post_decimals } else { pre_decimals };
            TokenTransferDelta {
                mint,
                owner,
                pre: pre_amount,
                post: post_amount,
                delta: post_amount - pre_amount,
                decimals,
            }
        })
        .filter(|d| d.delta != 0)
        .collect()
}

pub fn enrich(tx: &Transaction) -> Addons {
    Addons {
        compute_units_consumed: compute_units(tx),
        instruction_count: instruction_count(tx),
        loaded_addresses: tx.loaded_addresses.clone(),
        platform: platform_identifier(tx),
        token_transfer_summary: token_transfer_summary(tx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InnerInstructionGroup, Instruction, LoadedAddresses, Message, Meta, TokenBalance, UiTokenAmount};

    fn base_tx() -> Transaction {
        Transaction {
            slot: 1,
            block_time: None,
            signatures: vec!["sig1".into()],
            message: Message {
                account_keys: vec!["a".into()],
                recent_blockhash: "bh".into(),
                instructions: vec![Instruction {
                    program_id_index: 0,
                    accounts: vec![],
                    data: String::new(),
                    stack_height: None,
                }],
                address_table_lookups: vec![],
            },
            meta: Meta {
                fee: 0,
                pre_balances: vec![],
                post_balances: vec![],
                pre_token_balances: vec![],
                post_token_balances: vec![],
                inner_instructions: vec![InnerInstructionGroup {
                    index: 0,
                    instructions: vec![
                        Instruction { program_id_index: 0, accounts: vec![], data: String::new(), stack_height: None },
                        Instruction { program_id_index: 0, accounts: vec![], data: String::new(), stack_height: None },
                    ],
                }],
                log_messages: vec![],
                err: None,
                status: serde_json::json!({"Ok": null}),
                compute_units_consumed: Some(5000),
            },
            loaded_addresses: LoadedAddresses::default(),
        }
    }

    #[test]
    fn instruction_count_sums_top_level_and_inner() {
        let tx = base_tx();
        assert_eq!(instruction_count(&tx), 3);
    }

    #[test]
    fn platform_identifier_matches_known_address() {
        let mut tx = base_tx();
        tx.message.account_keys.push("AVUCZyuT35YSuj4RH7fwiyPu82Djn2Hfg7y2ND2XcnZH".to_string());
        let result = platform_identifier(&tx);
        assert_eq!(result, Some(("AVUCZyuT35YSuj4RH7fwiyPu82Djn2Hfg7y2ND2XcnZH".to_string(), "Photon".to_string())));
    }

    #[test]
    fn platform_identifier_is_none_when_absent() {
        let tx = base_tx();
        assert_eq!(platform_identifier(&tx), None);
    }

    #[test]
    fn token_transfer_summary_nets_pre_and_post() {
        let mut tx = base_tx();
        tx.meta.pre_token_balances = vec![TokenBalance {
            account_index: 0,
            mint: "mint_a".into(),
            owner: Some("wallet".into()),
            program_id: None,
            ui_token_amount: UiTokenAmount { amount: "1000".into(), decimals: 6, ui_amount: None, ui_amount_string: "1000".into() },
        }];
        tx.meta.post_token_balances = vec![TokenBalance {
            account_index: 0,
            mint: "mint_a".into(),
            owner: Some("wallet".into()),
            program_id: None,
            ui_token_amount: UiTokenAmount { amount: "600".into(), decimals: 6, ui_amount: None, ui_amount_string: "600".into() },
        }];
        let summary = token_transfer_summary(&tx);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].delta, -400);
    }
}
