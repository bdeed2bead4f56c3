//! Reduces a parsed-event list to one high-level domain summary (spec
//! §4.I), grounded on `soltxs/resolver/resolvers/{pumpfun,raydium}.py`.
//! Only one resolver is expected to match a given transaction; callers
//! decide how to combine the two optional results.

use crate::event::{BuySell, Event, Swap};
use serde::Serialize;

const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const SOL_MINT: &str = "11111111111111111111111111111111";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PumpFunSummary {
    pub signature: String,
    pub r#type: String,
    pub who: String,
    pub from_token: String,
    pub from_amount: f64,
    pub to_token: String,
    pub to_amount: f64,
    pub pre_token_balance: Option<f64>,
    pub post_token_balance: Option<f64>,
    pub pre_sol_balance: Option<f64>,
    pub post_sol_balance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaydiumSummary {
    pub signature: String,
    pub r#type: String,
    pub who: String,
    pub from_token: String,
    pub from_amount: f64,
    pub to_token: String,
    pub to_amount: f64,
    pub minimum_amount_out: f64,
    pub pre_token_balance: Option<f64>,
    pub post_token_balance: Option<f64>,
    pub pre_sol_balance: Option<f64>,
    pub post_sol_balance: Option<f64>,
}

fn scaled(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

fn scaled_opt(raw: Option<u64>, decimals: u8) -> Option<f64> {
    raw.filter(|v| *v != 0).map(|v| scaled(v, decimals))
}

/// Matches exactly one Buy/Sell event; any other count yields no summary.
pub fn resolve_pumpfun(events: &[Event]) -> Option<PumpFunSummary> {
    let mut matches = events.iter().filter_map(|e| match e {
        Event::BuySell(b) => Some(b),
        _ => None,
    });
    let instr: &BuySell = matches.next()?;
    if matches.next().is_some() {
        return None;
    }

    Some(PumpFunSummary {
        signature: instr.signature.clone(),
        r#type: instr.kind.lowercase().to_string(),
        who: instr.who.clone(),
        from_token: instr.from_token.clone(),
        from_amount: scaled(instr.from_token_amount, instr.from_token_decimals),
        to_token: instr.to_token.clone(),
        to_amount: scaled(instr.to_token_amount, instr.to_token_decimals),
        pre_token_balance: scaled_opt(instr.pre_token_balance, instr.from_token_decimals),
        post_token_balance: scaled_opt(instr.post_token_balance, instr.from_token_decimals),
        pre_sol_balance: scaled_opt(instr.pre_sol_balance, 9),
        post_sol_balance: scaled_opt(instr.post_sol_balance, 9),
    })
}

/// Matches Swap events; if more than one, narrows to those with both legs
/// nonzero, then requires exactly one survivor.
pub fn resolve_raydium(events: &[Event]) -> Option<RaydiumSummary> {
    let all: Vec<&Swap> = events
        .iter()
        .filter_map(|e| match e {
            Event::Swap(s) => Some(s),
            _ => None,
        })
        .collect();

    let narrowed: Vec<&Swap> = if all.len() > 1 {
        all.into_iter().filter(|s| s.from_token_amount > 0 && s.to_token_amount > 0).collect()
    } else {
        all
    };

    if narrowed.len() != 1 {
        return None;
    }
    let instr = narrowed[0];

    let swap_type = if instr.from_token == WSOL_MINT || instr.from_token == SOL_MINT {
        "buy"
    } else if instr.to_token == WSOL_MINT || instr.to_token == SOL_MINT {
        "sell"
    } else {
        "swap"
    };
    let balance_decimals = if swap_type == "buy" { instr.to_token_decimals } else { instr.from_token_decimals };

    Some(RaydiumSummary {
        signature: instr.signature.clone(),
        r#type: swap_type.to_string(),
        who: instr.who.clone(),
        from_token: instr.from_token.clone(),
        from_amount: scaled(instr.from_token_amount, instr.from_token_decimals),
        to_token: instr.to_token.clone(),
        to_amount: scaled(instr.to_token_amount, instr.to_token_decimals),
        minimum_amount_out: scaled(instr.minimum_amount_out, instr.to_token_decimals),
        pre_token_balance: scaled_opt(instr.pre_token_balance, balance_decimals),
        post_token_balance: scaled_opt(instr.post_token_balance, balance_decimals),
        pre_sol_balance: scaled_opt(instr.pre_sol_balance, 9),
        post_sol_balance: scaled_opt(instr.post_sol_balance, 9),
    })
}
