//! The parsed-instruction tagged union (spec §3 "Parsed event families",
//! §9 "express as ... a tagged union"). One concrete Rust enum replaces the
//! source's class hierarchy; `Buy` and `Sell` are the same shape so they
//! share one struct distinguished by `TradeKind`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeKind {
    Buy,
    Sell,
}

impl TradeKind {
    pub fn instruction_name(self) -> &'static str {
        match self {
            TradeKind::Buy => "Buy",
            TradeKind::Sell => "Sell",
        }
    }

    pub fn lowercase(self) -> &'static str {
        match self {
            TradeKind::Buy => "buy",
            TradeKind::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub signature: String,
    pub program_id: String,
    pub program_name: String,
    pub instruction_name: String,
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub authority: String,
}

/// Shared shape for PumpFun/Mortem/unknown-fallback Buy and Sell events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuySell {
    pub kind: TradeKind,
    pub signature: String,
    pub program_id: String,
    pub program_name: String,
    pub who: String,
    pub from_token: String,
    pub from_token_decimals: u8,
    pub to_token: String,
    pub to_token_decimals: u8,
    pub from_token_amount: u64,
    pub to_token_amount: u64,
    pub pre_token_balance: Option<u64>,
    pub post_token_balance: Option<u64>,
    pub pre_sol_balance: Option<u64>,
    pub post_sol_balance: Option<u64>,
}

impl BuySell {
    pub fn instruction_name(&self) -> &'static str {
        self.kind.instruction_name()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swap {
    pub signature: String,
    pub program_id: String,
    pub program_name: String,
    pub who: String,
    pub from_token: String,
    pub from_token_decimals: u8,
    pub to_token: String,
    pub to_token_decimals: u8,
    pub from_token_amount: u64,
    pub to_token_amount: u64,
    pub minimum_amount_out: u64,
    pub pre_token_balance: Option<u64>,
    pub post_token_balance: Option<u64>,
    pub pre_sol_balance: Option<u64>,
    pub post_sol_balance: Option<u64>,
}

/// Thin descriptor for System/ComputeBudget variants (spec §4.E.v): these
/// programs don't carry transfer/swap semantics worth a richer shape, just a
/// recognized instruction name and, where one exists, its single numeric
/// argument (lamports, compute unit limit, micro-lamport price, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramVariant {
    pub signature: String,
    pub program_id: String,
    pub program_name: String,
    pub instruction_name: String,
    pub value: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unknown {
    pub signature: String,
    pub program_id: String,
    pub program_name: String,
    pub instruction_name: String,
    pub instruction_index: usize,
}

impl Unknown {
    pub fn new(signature: impl Into<String>, program_id: impl Into<String>, instruction_index: usize) -> Self {
        Unknown {
            signature: signature.into(),
            program_id: program_id.into(),
            program_name: "Unknown".to_string(),
            instruction_name: "Unknown".to_string(),
            instruction_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_kind")]
pub enum Event {
    Transfer(Transfer),
    BuySell(BuySell),
    Swap(Swap),
    ProgramVariant(ProgramVariant),
    Unknown(Unknown),
}

impl Event {
    pub fn signature(&self) -> &str {
        match self {
            Event::Transfer(e) => &e.signature,
            Event::BuySell(e) => &e.signature,
            Event::Swap(e) => &e.signature,
            Event::ProgramVariant(e) => &e.signature,
            Event::Unknown(e) => &e.signature,
        }
    }
}
