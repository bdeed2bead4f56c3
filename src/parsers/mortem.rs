//! Mortem Buy/Sell decoder (spec §4.E.iv), grounded directly on
//! `mortem.py::_MortemParser`. Mortem carries no swap data of its own —
//! every Buy/Sell is reconstructed from an inner PumpFun-shaped `SwapData`
//! record. The outer instruction's 4-byte discriminator picks which of the
//! `"buy\0"` / `"sell"` / default tables handles it; each table walks the
//! same scan but differs in whether it may accept the other side's flag.

use crate::codec::decode_payload;
use crate::error::InstructionDecodeError;
use crate::event::{BuySell, Event, TradeKind};
use crate::model::Transaction;
use crate::swap_data::{decode_swap_data, SwapData};

const TAG_BUY: [u8; 4] = *b"buy\0";
const TAG_SELL: [u8; 4] = *b"sell";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tag {
    Buy,
    Sell,
    Default,
}

/// Discriminator is the leading 4 bytes of the payload (spec §4.E.iv); an
/// undecodable or truncated payload dispatches to the same `default` table
/// entry the source falls through to for any unrecognized tag.
fn discriminator(raw_data: &str) -> Tag {
    match decode_payload(raw_data).ok().and_then(|data| data.get(0..4).map(|b| [b[0], b[1], b[2], b[3]])) {
        Some(tag) if tag == TAG_BUY => Tag::Buy,
        Some(tag) if tag == TAG_SELL => Tag::Sell,
        _ => Tag::Default,
    }
}

pub const PROGRAM_ID: &str = "FAdo9NCw1ssek6Z6yeWzWjhLVsr8uiCwcWNUnKgzTnHe";
pub const PROGRAM_NAME: &str = "Mortem";
const PUMPFUN_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const SOL_DECIMALS: u8 = 9;

fn token_decimals(tx: &Transaction, mint: &str) -> Result<u8, InstructionDecodeError> {
    if mint == WSOL_MINT {
        return Ok(SOL_DECIMALS);
    }
    tx.meta
        .pre_token_balances
        .iter()
        .chain(tx.meta.post_token_balances.iter())
        .find(|tb| tb.mint == mint)
        .map(|tb| tb.ui_token_amount.decimals)
        .ok_or_else(|| InstructionDecodeError::DecimalsUnknown(mint.to_string()))
}

/// Inner instructions from Mortem or PumpFun itself, decoded as `SwapData`,
/// in the order they appear (§4.E.iv: "first `is_buy` / first `!is_buy`
/// wins", mirroring the source's ordered scan).
fn parse_swap(tx: &Transaction, instruction_index: usize) -> Vec<SwapData> {
    let full = tx.full_account_list();
    let mut out = Vec::new();
    for group in tx
        .meta
        .inner_instructions
        .iter()
        .filter(|g| g.index as usize == instruction_index)
    {
        for inner in &group.instructions {
            let sub_program_id = full.get(inner.program_id_index as usize).unwrap_or_default();
            if sub_program_id != PROGRAM_ID && sub_program_id != PUMPFUN_PROGRAM_ID {
                continue;
            }
            let raw = match bs58::decode(&inner.data).into_vec() {
                Ok(bytes) => bytes,
                Err(_) => match base64::decode(&inner.data) {
                    Ok(bytes) => bytes,
                    Err(_) => continue,
                },
            };
            if let Some(swap) = decode_swap_data(&raw) {
                out.push(swap);
            }
        }
    }
    out
}

fn build_buy(tx: &Transaction, signature: &str, swap: &SwapData) -> Result<Event, InstructionDecodeError> {
    let to_token = swap.mint.to_string();
    let to_token_decimals = token_decimals(tx, &to_token)?;
    Ok(Event::BuySell(BuySell {
        kind: TradeKind::Buy,
        signature: signature.to_string(),
        program_id: PROGRAM_ID.to_string(),
        program_name: PROGRAM_NAME.to_string(),
        who: swap.user.to_string(),
        from_token: WSOL_MINT.to_string(),
        from_token_decimals: SOL_DECIMALS,
        to_token,
        to_token_decimals,
        from_token_amount: swap.sol_amount,
        to_token_amount: swap.token_amount,
        pre_token_balance: None,
        post_token_balance: None,
        pre_sol_balance: None,
        post_sol_balance: None,
    }))
}

fn build_sell(tx: &Transaction, signature: &str, swap: &SwapData) -> Result<Event, InstructionDecodeError> {
    let from_token = swap.mint.to_string();
    let from_token_decimals = token_decimals(tx, &from_token)?;
    Ok(Event::BuySell(BuySell {
        kind: TradeKind::Sell,
        signature: signature.to_string(),
        program_id: PROGRAM_ID.to_string(),
        program_name: PROGRAM_NAME.to_string(),
        who: swap.user.to_string(),
        from_token,
        from_token_decimals,
        to_token: WSOL_MINT.to_string(),
        to_token_decimals: SOL_DECIMALS,
        from_token_amount: swap.token_amount,
        to_token_amount: swap.sol_amount,
        pre_token_balance: None,
        post_token_balance: None,
        pre_sol_balance: None,
        post_sol_balance: None,
    }))
}

/// Entry point: the outer instruction's own discriminator picks which of
/// the three handlers runs, all sharing the inner-instruction scan above.
/// `"buy\0"` and `"sell"` commit strictly to their own flag and never fall
/// back to the other; only the default table entry prefers buy, then sell.
pub fn decode(
    tx: &Transaction,
    signature: &str,
    instruction_index: usize,
    _accounts: &[u8],
    raw_data: &str,
) -> Result<Event, InstructionDecodeError> {
    let swaps = parse_swap(tx, instruction_index);
    match discriminator(raw_data) {
        Tag::Buy => swaps
            .iter()
            .find(|s| s.is_buy)
            .ok_or(InstructionDecodeError::NoSwapDataFound)
            .and_then(|swap| build_buy(tx, signature, swap)),
        Tag::Sell => swaps
            .iter()
            .find(|s| !s.is_buy)
            .ok_or(InstructionDecodeError::NoSwapDataFound)
            .and_then(|swap| build_sell(tx, signature, swap)),
        Tag::Default => {
            if let Some(swap) = swaps.iter().find(|s| s.is_buy) {
                return build_buy(tx, signature, swap);
            }
            if let Some(swap) = swaps.iter().find(|s| !s.is_buy) {
                return build_sell(tx, signature, swap);
            }
            Err(InstructionDecodeError::NoSwapDataFound)
        }
    }
}
