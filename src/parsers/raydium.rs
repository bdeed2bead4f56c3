//! Raydium AMM v4 swap decoder (spec §4.E.ii), grounded directly on
//! `raydiumAMM.py::process_Swap`, sell-side fixup included.

use super::token_program;
use crate::codec::decode_payload;
use crate::error::InstructionDecodeError;
use crate::event::{Event, Swap};
use crate::model::{FullAccountList, Transaction};
use std::collections::HashMap;

pub const PROGRAM_ID: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
pub const PROGRAM_NAME: &str = "RaydiumAMM";
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const SOL_DECIMALS: u8 = 9;

const TAG_SWAP: u8 = 9;

fn read_u64_le(data: &[u8], offset: usize) -> Result<u64, InstructionDecodeError> {
    let bytes: [u8; 8] = data
        .get(offset..offset + 8)
        .ok_or(InstructionDecodeError::TruncatedPayload)?
        .try_into()
        .map_err(|_| InstructionDecodeError::TruncatedPayload)?;
    Ok(u64::from_le_bytes(bytes))
}

fn resolve(full: &FullAccountList, index: u8) -> String {
    full.get(index as usize).unwrap_or_default().to_string()
}

pub fn decode(
    tx: &Transaction,
    signature: &str,
    instruction_index: usize,
    accounts: &[u8],
    raw_data: &str,
) -> Result<Event, InstructionDecodeError> {
    let data = decode_payload(raw_data)?;
    let tag = *data.first().ok_or(InstructionDecodeError::TruncatedPayload)?;
    if tag != TAG_SWAP {
        return Err(InstructionDecodeError::UnknownDiscriminator);
    }
    process_swap(tx, signature, instruction_index, accounts, raw_data)
}

/// Mirrors the source's own redundant re-decode of the instruction payload
/// inside the Swap handler (spec §9 open question 1): this call does not
/// rely on a different result than the dispatcher's decode above.
pub fn process_swap(
    tx: &Transaction,
    signature: &str,
    instruction_index: usize,
    accounts: &[u8],
    raw_data: &str,
) -> Result<Event, InstructionDecodeError> {
    let decoded_data = decode_payload(raw_data)?;
    let amount_in = read_u64_le(&decoded_data, 1)?;
    let minimum_amount_out = read_u64_le(&decoded_data, 9)?;

    if accounts.len() < 3 {
        return Err(InstructionDecodeError::TruncatedPayload);
    }
    let full = tx.full_account_list();
    let user_source_idx = accounts[accounts.len() - 3];
    let user_destination_idx = accounts[accounts.len() - 2];
    let who_idx = accounts[accounts.len() - 1];
    let user_source = resolve(&full, user_source_idx);
    let user_destination = resolve(&full, user_destination_idx);
    let who = resolve(&full, who_idx);

    let mut from_token = WSOL_MINT.to_string();
    let mut from_token_decimals = SOL_DECIMALS;
    let mut to_token = WSOL_MINT.to_string();
    let mut to_token_decimals = SOL_DECIMALS;

    for tb in tx
        .meta
        .pre_token_balances
        .iter()
        .chain(tx.meta.post_token_balances.iter())
    {
        let token_account = full.get(tb.account_index as usize).unwrap_or_default();
        if token_account == user_source {
            from_token = tb.mint.clone();
            from_token_decimals = tb.ui_token_amount.decimals;
        } else if token_account == user_destination {
            to_token = tb.mint.clone();
            to_token_decimals = tb.ui_token_amount.decimals;
        }
    }

    let pre_token_balance = tx
        .meta
        .pre_token_balances
        .iter()
        .find(|tb| tb.account_index == user_source_idx as u32)
        .and_then(|tb| tb.ui_token_amount.amount.parse::<u64>().ok());
    let post_token_balance = tx
        .meta
        .post_token_balances
        .iter()
        .find(|tb| tb.account_index == user_source_idx as u32)
        .and_then(|tb| tb.ui_token_amount.amount.parse::<u64>().ok());

    let pre_sol_balance = tx.meta.pre_balances.get(who_idx as usize).copied();
    let post_sol_balance = tx.meta.post_balances.get(who_idx as usize).copied();

    let mut to_token_amount = 0u64;
    for group in tx
        .meta
        .inner_instructions
        .iter()
        .filter(|g| g.index as usize == instruction_index)
    {
        for inner in &group.instructions {
            let prog_id = full.get(inner.program_id_index as usize).unwrap_or_default();
            if prog_id == token_program::PROGRAM_ID {
                if let Ok(Event::Transfer(t)) = token_program::decode(
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

    // Sell-side fixup: no inner TokenProgram transfer surfaced an amount, but
    // the destination is WSOL, so fall back to the pre/post balance delta
    // and finally to the ray_log telemetry line.
    if to_token == WSOL_MINT && to_token_amount == 0 {
        let mut post_wsol: HashMap<u32, u64> = HashMap::new();
        for tb in &tx.meta.post_token_balances {
            if tb.mint == WSOL_MINT {
                if let Ok(amt) = tb.ui_token_amount.amount.parse::<u64>() {
                    post_wsol.insert(tb.account_index, amt);
                }
            }
        }
        let mut candidate_amount = 0u64;
        let mut candidate_decimals = SOL_DECIMALS;
        for tb in &tx.meta.pre_token_balances {
            if tb.mint == WSOL_MINT {
                if let Ok(pre_amount) = tb.ui_token_amount.amount.parse::<u64>() {
                    let post_amount = post_wsol.get(&tb.account_index).copied().unwrap_or(pre_amount);
                    let delta = pre_amount.saturating_sub(post_amount);
                    if delta > candidate_amount {
                        candidate_amount = delta;
                        candidate_decimals = tb.ui_token_amount.decimals;
                    }
                }
            }
        }
        if candidate_amount > 0 {
            to_token_amount = candidate_amount;
            to_token_decimals = candidate_decimals;
        } else {
            for log in &tx.meta.log_messages {
                if let Some(idx) = log.find("ray_log:") {
                    let raw_log = log[idx + "ray_log:".len()..].trim();
                    if let Ok(decoded_log) = bs58::decode(raw_log).into_vec() {
                        if decoded_log.len() >= 17 {
                            if let Ok(amt) = read_u64_le(&decoded_log, 9) {
                                if amt > 0 {
                                    to_token_amount = amt;
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(Event::Swap(Swap {
        signature: signature.to_string(),
        program_id: PROGRAM_ID.to_string(),
        program_name: PROGRAM_NAME.to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InnerInstructionGroup, Instruction, LoadedAddresses, Message, Meta, TokenBalance, UiTokenAmount};

    fn make_tb(account_index: u32, mint: &str, amount: &str, decimals: u8) -> TokenBalance {
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

    fn base_swap_payload(amount_in: u64, minimum_amount_out: u64) -> String {
        let mut payload = vec![TAG_SWAP];
        payload.extend_from_slice(&amount_in.to_le_bytes());
        payload.extend_from_slice(&minimum_amount_out.to_le_bytes());
        bs58::encode(&payload).into_string()
    }

    // Accounts tail is always [user_source, user_destination, wallet].
    fn base_transaction(pre_tb: Vec<TokenBalance>, post_tb: Vec<TokenBalance>, inner_instructions: Vec<InnerInstructionGroup>) -> Transaction {
        Transaction {
            slot: 1,
            block_time: None,
            signatures: vec!["sig1".into()],
            message: Message {
                account_keys: vec![
                    "user_source".to_string(),
                    "user_destination".to_string(),
                    "wallet".to_string(),
                    token_program::PROGRAM_ID.to_string(),
                ],
                recent_blockhash: "bh".into(),
                instructions: vec![],
                address_table_lookups: vec![],
            },
            meta: Meta {
                fee: 0,
                pre_balances: vec![0, 0, 5_000_000_000],
                post_balances: vec![0, 0, 4_900_000_000],
                pre_token_balances: pre_tb,
                post_token_balances: post_tb,
                inner_instructions,
                log_messages: vec![],
                err: None,
                status: serde_json::json!({"Ok": null}),
                compute_units_consumed: None,
            },
            loaded_addresses: LoadedAddresses::default(),
        }
    }

    #[test]
    fn scenario_s1_minimal_rpc_raydium_buy() {
        // Buying a mint with WSOL: user_source holds WSOL, user_destination
        // holds the mint, and an inner TokenProgram Transfer to
        // user_destination carries the purchased amount.
        let pre_tb = vec![make_tb(0, WSOL_MINT, "100000000", 9)];
        let post_tb = vec![make_tb(1, "mint_dest", "123456", 6)];
        let mut transfer_payload = vec![3u8]; // Transfer tag
        transfer_payload.extend_from_slice(&123456u64.to_le_bytes());
        let inner_instructions = vec![InnerInstructionGroup {
            index: 0,
            instructions: vec![Instruction {
                program_id_index: 3,
                accounts: vec![0, 1, 2],
                data: bs58::encode(&transfer_payload).into_string(),
                stack_height: None,
            }],
        }];
        let tx = base_transaction(pre_tb, post_tb, inner_instructions);
        let raw = base_swap_payload(100_000_000, 1);
        let event = decode(&tx, "sig1", 0, &[0, 1, 2], &raw).unwrap();
        match event {
            Event::Swap(s) => {
                assert_eq!(s.from_token_amount, 100_000_000);
                assert_eq!(s.minimum_amount_out, 1);
                assert_eq!(s.to_token_amount, 123456);
            }
            _ => panic!("expected Swap"),
        }
    }

    #[test]
    fn scenario_s2_sell_falls_back_to_wsol_delta() {
        // Selling a mint for WSOL: no inner TokenProgram transfer surfaces an
        // amount, but user_destination's WSOL balance drops by 2_000_000_000.
        let pre_tb = vec![
            make_tb(0, "mint_src", "500000", 6),
            make_tb(1, WSOL_MINT, "5000000000", 9),
        ];
        let post_tb = vec![
            make_tb(0, "mint_src", "400000", 6),
            make_tb(1, WSOL_MINT, "3000000000", 9),
        ];
        let tx = base_transaction(pre_tb, post_tb, vec![]);
        let raw = base_swap_payload(100_000, 1);
        let event = decode(&tx, "sig1", 0, &[0, 1, 2], &raw).unwrap();
        match event {
            Event::Swap(s) => {
                assert_eq!(s.to_token_amount, 2_000_000_000);
                assert_eq!(s.to_token_decimals, 9);
            }
            _ => panic!("expected Swap"),
        }
    }
}
