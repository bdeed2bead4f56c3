//! PumpFun Buy/Sell decoder (spec §4.E.iii). No dedicated PumpFun source file
//! exists in the corpus this was distilled from — grounded on `unknown.py`'s
//! `_build_buy`/`_build_sell` shape for the event fields, with the
//! discriminator and payload layout taken from spec §4.E.iii directly: an
//! 8-byte anchor-style hash identifies `buy` and `sell`, and the payload
//! itself (not an inner `SwapData` record) carries the raw amounts.

use crate::codec::decode_payload;
use crate::discriminator::anchor_discriminator;
use crate::error::InstructionDecodeError;
use crate::event::{BuySell, Event, TradeKind};
use crate::model::{FullAccountList, Transaction};

pub const PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
pub const PROGRAM_NAME: &str = "PumpFun";
const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const SOL_DECIMALS: u8 = 9;

// Account layout for both Buy and Sell: [mint, bonding_curve, ..., user, ...].
const ACCOUNT_INDEX_MINT: usize = 2;
const ACCOUNT_INDEX_USER: usize = 6;

fn read_u64_le(data: &[u8], offset: usize) -> Result<u64, InstructionDecodeError> {
    let bytes: [u8; 8] = data
        .get(offset..offset + 8)
        .ok_or(InstructionDecodeError::TruncatedPayload)?
        .try_into()
        .map_err(|_| InstructionDecodeError::TruncatedPayload)?;
    Ok(u64::from_le_bytes(bytes))
}

fn resolve(full: &FullAccountList, accounts: &[u8], position: usize) -> String {
    accounts
        .get(position)
        .and_then(|idx| full.get(*idx as usize))
        .unwrap_or_default()
        .to_string()
}

fn token_decimals(tx: &Transaction, mint: &str) -> u8 {
    tx.meta
        .pre_token_balances
        .iter()
        .chain(tx.meta.post_token_balances.iter())
        .find(|tb| tb.mint == mint)
        .map(|tb| tb.ui_token_amount.decimals)
        .unwrap_or(6)
}

pub fn decode(
    tx: &Transaction,
    signature: &str,
    _instruction_index: usize,
    accounts: &[u8],
    raw_data: &str,
) -> Result<Event, InstructionDecodeError> {
    let data = decode_payload(raw_data)?;
    let tag: [u8; 8] = data
        .get(0..8)
        .ok_or(InstructionDecodeError::TruncatedPayload)?
        .try_into()
        .map_err(|_| InstructionDecodeError::TruncatedPayload)?;

    let kind = if tag == anchor_discriminator("buy") {
        TradeKind::Buy
    } else if tag == anchor_discriminator("sell") {
        TradeKind::Sell
    } else {
        return Err(InstructionDecodeError::UnknownDiscriminator);
    };

    let full = tx.full_account_list();
    let who = resolve(&full, accounts, ACCOUNT_INDEX_USER);
    let mint = resolve(&full, accounts, ACCOUNT_INDEX_MINT);
    let mint_decimals = token_decimals(tx, &mint);

    // Buy: (amount, max_sol_cost). Sell: (amount, min_sol_output). Both u64 LE
    // following the 8-byte discriminator.
    let token_amount = read_u64_le(&data, 8)?;
    let sol_amount = read_u64_le(&data, 16)?;

    let (from_token, from_token_decimals, to_token, to_token_decimals, from_token_amount, to_token_amount) =
        match kind {
            TradeKind::Buy => (
                WSOL_MINT.to_string(),
                SOL_DECIMALS,
                mint,
                mint_decimals,
                sol_amount,
                token_amount,
            ),
            TradeKind::Sell => (
                mint,
                mint_decimals,
                WSOL_MINT.to_string(),
                SOL_DECIMALS,
                token_amount,
                sol_amount,
            ),
        };

    Ok(Event::BuySell(BuySell {
        kind,
        signature: signature.to_string(),
        program_id: PROGRAM_ID.to_string(),
        program_name: PROGRAM_NAME.to_string(),
        who,
        from_token,
        from_token_decimals,
        to_token,
        to_token_decimals,
        from_token_amount,
        to_token_amount,
        pre_token_balance: None,
        post_token_balance: None,
        pre_sol_balance: None,
        post_sol_balance: None,
    }))
}
