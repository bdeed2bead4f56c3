//! Heuristic fallback for programs absent from `registry` (spec §4.F),
//! grounded directly on `soltxs/parser/parsers/unknown.py::UnknownParser`.
//! Tries, in order: a PumpFun-shaped inner/top-level swap-data scan, an
//! explicit Raydium swap-data scan, a `"SwapRaydiumV4"` log hint, then a
//! balance-drop/balance-rise inference, before giving up with `Unknown`.

use crate::error::InstructionDecodeError;
use crate::event::{BuySell, Event, Swap, TradeKind, Unknown};
use crate::model::{FullAccountList, TokenBalance, Transaction};
use crate::swap_data::{decode_swap_data, SwapData};
use std::collections::HashSet;

const PUMPFUN_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
const RAYDIUM_AMM_PROGRAM_ID: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const SOL_DECIMALS: u8 = 9;

fn blacklisted(program_id: &str) -> bool {
    matches!(
        program_id,
        "111111111111111111111111111111111" | "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
    )
}

fn token_decimals(tx: &Transaction, mint: &str) -> Option<u8> {
    if mint == WSOL_MINT {
        return Some(SOL_DECIMALS);
    }
    tx.meta
        .pre_token_balances
        .iter()
        .chain(tx.meta.post_token_balances.iter())
        .find(|tb| tb.mint == mint)
        .map(|tb| tb.ui_token_amount.decimals)
}

fn decode_payload_lenient(data: &str) -> Option<Vec<u8>> {
    bs58::decode(data).into_vec().ok().or_else(|| base64::decode(data).ok())
}

/// Collects PumpFun/Raydium-shaped `SwapData` records from both inner and
/// top-level instructions, tagged with the program id that carried them.
fn parse_swap_events(tx: &Transaction) -> Vec<(SwapData, String)> {
    let full = tx.full_account_list();
    let mut events = Vec::new();

    for group in &tx.meta.inner_instructions {
        for inner in &group.instructions {
            let origin = full.get(inner.program_id_index as usize).unwrap_or_default();
            if origin != PUMPFUN_PROGRAM_ID && origin != RAYDIUM_AMM_PROGRAM_ID {
                continue;
            }
            if let Some(raw) = decode_payload_lenient(&inner.data) {
                if let Some(swap) = decode_swap_data(&raw) {
                    events.push((swap, origin.to_string()));
                }
            }
        }
    }

    for instruction in &tx.message.instructions {
        let origin = full.get(instruction.program_id_index as usize).unwrap_or_default();
        if origin != PUMPFUN_PROGRAM_ID && origin != RAYDIUM_AMM_PROGRAM_ID {
            continue;
        }
        if let Some(raw) = decode_payload_lenient(&instruction.data) {
            if let Some(swap) = decode_swap_data(&raw) {
                events.push((swap, origin.to_string()));
            }
        }
    }

    events
}

/// Mirrors the source computing `to_decimals`/`from_decimals` via
/// `_get_token_decimals` while building the dedup key: a mint with no known
/// decimals means the event is dropped here, the same as the source's
/// `except (ValueError, AttributeError): continue`.
fn dedup_key(tx: &Transaction, signature: &str, origin: &str, swap: &SwapData) -> Option<(String, String, String, String, String, u8, u8, u64, u64)> {
    let user = swap.user.to_string();
    let mint = swap.mint.to_string();
    if swap.is_buy {
        let to_decimals = token_decimals(tx, &mint)?;
        Some((
            signature.to_string(),
            origin.to_string(),
            "Buy".to_string(),
            user,
            WSOL_MINT.to_string(),
            SOL_DECIMALS,
            mint,
            to_decimals,
            swap.sol_amount,
            swap.token_amount,
        ))
    } else {
        let from_decimals = token_decimals(tx, &mint)?;
        Some((
            signature.to_string(),
            origin.to_string(),
            "Sell".to_string(),
            user,
            mint,
            from_decimals,
            WSOL_MINT.to_string(),
            SOL_DECIMALS,
            swap.token_amount,
            swap.sol_amount,
        ))
    }
}

fn build_buy(tx: &Transaction, signature: &str, swap: &SwapData, origin: &str) -> Option<Event> {
    let who = swap.user.to_string();
    let to_token = swap.mint.to_string();
    let to_token_decimals = token_decimals(tx, &to_token)?;
    let (pre_token_balance, post_token_balance, pre_sol_balance, post_sol_balance) =
        owner_balances(tx, &who, &to_token);
    Some(Event::BuySell(BuySell {
        kind: TradeKind::Buy,
        signature: signature.to_string(),
        program_id: origin.to_string(),
        program_name: "PumpFun".to_string(),
        who,
        from_token: WSOL_MINT.to_string(),
        from_token_decimals: SOL_DECIMALS,
        to_token,
        to_token_decimals,
        from_token_amount: swap.sol_amount,
        to_token_amount: swap.token_amount,
        pre_token_balance,
        post_token_balance,
        pre_sol_balance,
        post_sol_balance,
    }))
}

fn build_sell(tx: &Transaction, signature: &str, swap: &SwapData, origin: &str) -> Option<Event> {
    let who = swap.user.to_string();
    let from_token = swap.mint.to_string();
    let from_token_decimals = token_decimals(tx, &from_token)?;
    let (pre_token_balance, post_token_balance, pre_sol_balance, post_sol_balance) =
        owner_balances(tx, &who, &from_token);
    Some(Event::BuySell(BuySell {
        kind: TradeKind::Sell,
        signature: signature.to_string(),
        program_id: origin.to_string(),
        program_name: "PumpFun".to_string(),
        who,
        from_token,
        from_token_decimals,
        to_token: WSOL_MINT.to_string(),
        to_token_decimals: SOL_DECIMALS,
        from_token_amount: swap.token_amount,
        to_token_amount: swap.sol_amount,
        pre_token_balance,
        post_token_balance,
        pre_sol_balance,
        post_sol_balance,
    }))
}

/// Balances keyed by owner address rather than account index, since the
/// PumpFun swap-data record only carries the user's wallet address.
fn owner_balances(tx: &Transaction, who: &str, mint: &str) -> (Option<u64>, Option<u64>, Option<u64>, Option<u64>) {
    let amount_for = |tb: &TokenBalance| tb.ui_token_amount.amount.parse::<u64>().ok();
    let pre_sol = tx
        .meta
        .pre_token_balances
        .iter()
        .find(|tb| tb.mint == WSOL_MINT && tb.owner.as_deref() == Some(who))
        .and_then(amount_for);
    let post_sol = tx
        .meta
        .post_token_balances
        .iter()
        .find(|tb| tb.mint == WSOL_MINT && tb.owner.as_deref() == Some(who))
        .and_then(amount_for);
    let pre_token = tx
        .meta
        .pre_token_balances
        .iter()
        .find(|tb| tb.mint == mint && tb.owner.as_deref() == Some(who))
        .and_then(amount_for);
    let post_token = tx
        .meta
        .post_token_balances
        .iter()
        .find(|tb| tb.mint == mint && tb.owner.as_deref() == Some(who))
        .and_then(amount_for);
    (pre_token, post_token, pre_sol, post_sol)
}

fn read_u64_le(data: &[u8], offset: usize) -> Option<u64> {
    data.get(offset..offset + 8).and_then(|s| s.try_into().ok()).map(u64::from_le_bytes)
}

/// Raw Raydium-shaped payloads (leading tag byte + 16 bytes of amounts, no
/// discriminator check) from inner and top-level instructions, paired with
/// the outer instruction index they belong to.
fn parse_raydium_payloads(tx: &Transaction) -> Vec<(Vec<u8>, usize)> {
    let full = tx.full_account_list();
    let mut out = Vec::new();

    for (idx, instruction) in tx.message.instructions.iter().enumerate() {
        let origin = full.get(instruction.program_id_index as usize).unwrap_or_default();
        if origin != RAYDIUM_AMM_PROGRAM_ID {
            continue;
        }
        if let Some(raw) = decode_payload_lenient(&instruction.data) {
            if raw.len() >= 17 {
                out.push((raw, idx));
            }
        }
    }

    for group in &tx.meta.inner_instructions {
        for inner in &group.instructions {
            let origin = full.get(inner.program_id_index as usize).unwrap_or_default();
            if origin != RAYDIUM_AMM_PROGRAM_ID {
                continue;
            }
            if let Some(raw) = decode_payload_lenient(&inner.data) {
                if raw.len() >= 17 {
                    out.push((raw, group.index as usize));
                }
            }
        }
    }

    out
}

fn resolve(full: &FullAccountList, index: u8) -> String {
    full.get(index as usize).unwrap_or_default().to_string()
}

/// Builds a Swap from an explicit Raydium-shaped payload at a known outer
/// instruction index, reusing that instruction's account list the same way
/// `parsers::raydium::process_swap` does.
fn build_raydium_swap(tx: &Transaction, signature: &str, decoded_data: &[u8], instruction_index: usize) -> Option<Event> {
    let amount_in = read_u64_le(decoded_data, 1)?;
    let minimum_amount_out = read_u64_le(decoded_data, 9)?;

    let accounts: &[u8] = tx
        .message
        .instructions
        .get(instruction_index)
        .map(|i| i.accounts.as_slice())
        .unwrap_or(&[]);

    let full = tx.full_account_list();
    let (who, user_source, user_destination) = if accounts.len() >= 3 {
        (
            resolve(&full, accounts[accounts.len() - 1]),
            resolve(&full, accounts[accounts.len() - 3]),
            resolve(&full, accounts[accounts.len() - 2]),
        )
    } else {
        let fallback = full.get(0).unwrap_or_default().to_string();
        (fallback.clone(), fallback.clone(), fallback)
    };

    let mut from_token = WSOL_MINT.to_string();
    let mut from_token_decimals = SOL_DECIMALS;
    let mut to_token = WSOL_MINT.to_string();
    let mut to_token_decimals = SOL_DECIMALS;
    for tb in tx.meta.pre_token_balances.iter().chain(tx.meta.post_token_balances.iter()) {
        let token_account = full.get(tb.account_index as usize).unwrap_or_default();
        if token_account == user_source {
            from_token = tb.mint.clone();
            from_token_decimals = tb.ui_token_amount.decimals;
        } else if token_account == user_destination {
            to_token = tb.mint.clone();
            to_token_decimals = tb.ui_token_amount.decimals;
        }
    }

    let source_account_index = if accounts.len() >= 3 { accounts[accounts.len() - 3] as u32 } else { 0 };
    let wallet_account_index = if !accounts.is_empty() { accounts[accounts.len() - 1] as usize } else { 0 };

    let pre_token_balance = tx
        .meta
        .pre_token_balances
        .iter()
        .find(|tb| tb.account_index == source_account_index)
        .and_then(|tb| tb.ui_token_amount.amount.parse::<u64>().ok());
    let post_token_balance = tx
        .meta
        .post_token_balances
        .iter()
        .find(|tb| tb.account_index == source_account_index)
        .and_then(|tb| tb.ui_token_amount.amount.parse::<u64>().ok());
    let pre_sol_balance = tx.meta.pre_balances.get(wallet_account_index).copied();
    let post_sol_balance = tx.meta.post_balances.get(wallet_account_index).copied();

    let mut to_token_amount = 0u64;
    for group in tx.meta.inner_instructions.iter().filter(|g| g.index as usize == instruction_index) {
        for inner in &group.instructions {
            let prog_id = full.get(inner.program_id_index as usize).unwrap_or_default();
            if prog_id == crate::parsers::token_program::PROGRAM_ID {
                if let Ok(Event::Transfer(t)) = crate::parsers::token_program::decode(
                    tx,
                    signature,
                    instruction_index,
                    &inner.accounts,
                    &inner.data,
                ) {
                    if t.to == user_destination {
                        to_token_amount = t.amount;
                    }
                }
            }
        }
    }

    Some(Event::Swap(Swap {
        signature: signature.to_string(),
        program_id: RAYDIUM_AMM_PROGRAM_ID.to_string(),
        program_name: "RaydiumAMM".to_string(),
        who,
        from_token,
        from_token_decimals,
        to_token,
        to_token_decimals,
        from_token_amount: amount_in,
        to_token_amount,
        minimum_amount_out,
        pre_token_balance,
        post_token_balance,
        pre_sol_balance,
        post_sol_balance,
    }))
}

/// Last-resort inference: the token whose balance dropped the most and the
/// token whose balance rose the most, paired as a single Swap. Best-effort —
/// can misattribute in multi-hop transactions (spec §9).
fn infer_raydium_swap(tx: &Transaction, signature: &str) -> Option<Event> {
    if tx.meta.pre_token_balances.is_empty() && tx.meta.post_token_balances.is_empty() {
        return None;
    }
    let mut drop_candidate: Option<&TokenBalance> = None;
    let mut drop_amount: u64 = 0;
    let mut rise_candidate: Option<&TokenBalance> = None;
    let mut rise_amount: u64 = 0;

    for pre in &tx.meta.pre_token_balances {
        let Some(post) = tx.meta.post_token_balances.iter().find(|p| p.account_index == pre.account_index) else {
            continue;
        };
        let (Ok(pre_amount), Ok(post_amount)) = (
            pre.ui_token_amount.amount.parse::<u64>(),
            post.ui_token_amount.amount.parse::<u64>(),
        ) else {
            continue;
        };
        let delta = pre_amount.saturating_sub(post_amount);
        if delta > drop_amount {
            drop_amount = delta;
            drop_candidate = Some(pre);
        }
    }

    for post in &tx.meta.post_token_balances {
        let Some(pre) = tx.meta.pre_token_balances.iter().find(|p| p.account_index == post.account_index) else {
            continue;
        };
        let (Ok(pre_amount), Ok(post_amount)) = (
            pre.ui_token_amount.amount.parse::<u64>(),
            post.ui_token_amount.amount.parse::<u64>(),
        ) else {
            continue;
        };
        let delta = post_amount.saturating_sub(pre_amount);
        if delta > rise_amount {
            rise_amount = delta;
            rise_candidate = Some(post);
        }
    }

    let (drop, rise) = (drop_candidate?, rise_candidate?);
    let who = drop.owner.clone().unwrap_or_default();
    let full = tx.full_account_list();

    let pre_token_balance = tx
        .meta
        .pre_token_balances
        .iter()
        .find(|tb| tb.account_index == drop.account_index)
        .and_then(|tb| tb.ui_token_amount.amount.parse::<u64>().ok());
    let post_token_balance = tx
        .meta
        .post_token_balances
        .iter()
        .find(|tb| tb.account_index == drop.account_index)
        .and_then(|tb| tb.ui_token_amount.amount.parse::<u64>().ok());
    let wallet_account_index = full.index_of(&who).unwrap_or(0);
    let pre_sol_balance = tx.meta.pre_balances.get(wallet_account_index).copied();
    let post_sol_balance = tx.meta.post_balances.get(wallet_account_index).copied();

    Some(Event::Swap(Swap {
        signature: signature.to_string(),
        program_id: RAYDIUM_AMM_PROGRAM_ID.to_string(),
        program_name: "RaydiumAMM".to_string(),
        who,
        from_token: drop.mint.clone(),
        from_token_decimals: drop.ui_token_amount.decimals,
        to_token: rise.mint.clone(),
        to_token_decimals: rise.ui_token_amount.decimals,
        from_token_amount: drop_amount,
        to_token_amount: rise_amount,
        minimum_amount_out: 0,
        pre_token_balance,
        post_token_balance,
        pre_sol_balance,
        post_sol_balance,
    }))
}

pub fn decode(
    tx: &Transaction,
    signature: &str,
    instruction_index: usize,
    program_id: &str,
    allow_balance_inference: bool,
) -> Result<Event, InstructionDecodeError> {
    let allowed: Vec<(SwapData, String)> = parse_swap_events(tx).into_iter().filter(|(_, origin)| !blacklisted(origin)).collect();

    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for (swap, origin) in allowed {
        let Some(key) = dedup_key(tx, signature, &origin, &swap) else {
            continue;
        };
        if seen.insert(key) {
            unique.push((swap, origin));
        }
    }

    if let Some((swap, origin)) = unique.iter().find(|(s, _)| s.is_buy) {
        if let Some(event) = build_buy(tx, signature, swap, origin) {
            return Ok(event);
        }
    }
    if let Some((swap, origin)) = unique.iter().find(|(s, _)| !s.is_buy) {
        if let Some(event) = build_sell(tx, signature, swap, origin) {
            return Ok(event);
        }
    }

    let raydium_payloads = parse_raydium_payloads(tx);
    let mut seen_raydium = HashSet::new();
    let mut unique_raydium = Vec::new();
    for (decoded, idx) in raydium_payloads {
        let (Some(amount_in), Some(minimum_amount_out)) = (read_u64_le(&decoded, 1), read_u64_le(&decoded, 9)) else {
            continue;
        };
        let key = (signature.to_string(), idx, amount_in, minimum_amount_out);
        if seen_raydium.insert(key) {
            unique_raydium.push((decoded, idx));
        }
    }
    for (decoded, idx) in &unique_raydium {
        if let Some(event) = build_raydium_swap(tx, signature, decoded, *idx) {
            return Ok(event);
        }
    }

    if allow_balance_inference {
        if tx.meta.log_messages.iter().any(|log| log.contains("SwapRaydiumV4")) {
            if let Some(event) = infer_raydium_swap(tx, signature) {
                return Ok(event);
            }
        }

        if let Some(event) = infer_raydium_swap(tx, signature) {
            return Ok(event);
        }
    }

    log::debug!("instruction {instruction_index} on program {program_id} resolved to Unknown (signature {signature})");
    Ok(Event::Unknown(Unknown::new(signature, program_id, instruction_index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InnerInstructionGroup, Instruction, LoadedAddresses, Message, Meta, TokenBalance, UiTokenAmount};
    use borsh::BorshSerialize;
    use solana_sdk::pubkey::Pubkey;

    fn encode_swap(mint: Pubkey, sol_amount: u64, token_amount: u64, is_buy: bool, user: Pubkey) -> String {
        let data = crate::swap_data::SwapData {
            mint,
            sol_amount,
            token_amount,
            is_buy,
            user,
        };
        let mut out = vec![0u8; 16];
        data.serialize(&mut out).unwrap();
        bs58::encode(&out).into_string()
    }

    fn tb(account_index: u32, mint: &str, amount: &str, decimals: u8) -> TokenBalance {
        TokenBalance {
            account_index,
            mint: mint.to_string(),
            owner: None,
            program_id: None,
            ui_token_amount: UiTokenAmount {
                amount: amount.to_string(),
                decimals,
                ui_amount: None,
                ui_amount_string: amount.to_string(),
            },
        }
    }

    fn empty_tx(account_keys: Vec<&str>) -> Transaction {
        Transaction {
            slot: 1,
            block_time: None,
            signatures: vec!["sig1".into()],
            message: Message {
                account_keys: account_keys.into_iter().map(String::from).collect(),
                recent_blockhash: "bh".into(),
                instructions: vec![],
                address_table_lookups: vec![],
            },
            meta: Meta {
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
            },
            loaded_addresses: LoadedAddresses::default(),
        }
    }

    #[test]
    fn two_identical_pumpfun_buys_in_inner_instructions_dedup_to_one() {
        let mint = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let mut tx = empty_tx(vec![PUMPFUN_PROGRAM_ID]);
        tx.meta.pre_token_balances = vec![tb(0, &mint.to_string(), "0", 6)];
        let data = encode_swap(mint, 500_000_000, 7000, true, user);
        tx.meta.inner_instructions = vec![InnerInstructionGroup {
            index: 0,
            instructions: vec![
                Instruction { program_id_index: 0, accounts: vec![], data: data.clone(), stack_height: None },
                Instruction { program_id_index: 0, accounts: vec![], data, stack_height: None },
            ],
        }];
        let event = decode(&tx, "sig1", 0, "SomeUnknownProgram1111111111111111111111111", true).unwrap();
        match event {
            Event::BuySell(b) => {
                assert_eq!(b.kind, TradeKind::Buy);
                assert_eq!(b.from_token_amount, 500_000_000);
                assert_eq!(b.to_token_amount, 7000);
            }
            _ => panic!("expected BuySell"),
        }
    }

    #[test]
    fn no_evidence_anywhere_falls_back_to_unknown() {
        let tx = empty_tx(vec!["SomeUnknownProgram1111111111111111111111111"]);
        let event = decode(&tx, "sig1", 2, "SomeUnknownProgram1111111111111111111111111", true).unwrap();
        match event {
            Event::Unknown(u) => assert_eq!(u.instruction_index, 2),
            _ => panic!("expected Unknown"),
        }
    }

    #[test]
    fn infers_swap_from_largest_balance_drop_and_rise() {
        let mut tx = empty_tx(vec!["SomeUnknownProgram1111111111111111111111111"]);
        tx.meta.pre_token_balances = vec![
            tb(0, "mint_a", "1000000", 6),
            tb(1, "mint_b", "0", 6),
        ];
        tx.meta.post_token_balances = vec![
            tb(0, "mint_a", "400000", 6),
            tb(1, "mint_b", "250000", 6),
        ];
        let event = decode(&tx, "sig1", 0, "SomeUnknownProgram1111111111111111111111111", true).unwrap();
        match event {
            Event::Swap(s) => {
                assert_eq!(s.from_token, "mint_a");
                assert_eq!(s.from_token_amount, 600_000);
                assert_eq!(s.to_token, "mint_b");
                assert_eq!(s.to_token_amount, 250_000);
            }
            _ => panic!("expected Swap"),
        }
    }
}
