//! Public surface stitching normalize → parse → resolve (spec §4.J),
//! grounded on `main.py`'s call order and `soltxs/parser/__init__.py::parse`.
//! `process` is named in the source but left commented out there too; it has
//! no behavior to ground and is not exposed here.

use crate::addons::{self, Addons};
use crate::dedup;
use crate::error::DecodeError;
use crate::event::Event;
use crate::model::Transaction;
use crate::registry;
use crate::resolver::{self, PumpFunSummary, RaydiumSummary};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTransaction {
    pub signatures: Vec<String>,
    pub instructions: Vec<Event>,
    pub addons: Addons,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ResolvedSummary {
    pub pumpfun: Option<PumpFunSummary>,
    pub raydium: Option<RaydiumSummary>,
}

/// Parses every top-level instruction of a normalized transaction via the
/// registry (falling through to the unknown-program heuristic), then
/// deduplicates and enriches the result. Allows the unknown-program
/// fallback's best-effort balance-inference heuristic (spec §9).
pub fn parse(tx: &Transaction) -> ParsedTransaction {
    parse_with_options(tx, true)
}

/// Same as `parse`, but disables the unknown-program fallback's balance-drop
/// / balance-rise inference (spec §9: "expose a flag to disable inference
/// for strict callers"). Such instructions surface as `Unknown` instead of a
/// best-effort `Swap`.
pub fn parse_strict(tx: &Transaction) -> ParsedTransaction {
    parse_with_options(tx, false)
}

fn parse_with_options(tx: &Transaction, allow_balance_inference: bool) -> ParsedTransaction {
    let instructions: Vec<Event> = (0..tx.message.instructions.len())
        .map(|idx| registry::route(tx, idx, allow_balance_inference))
        .collect();

    ParsedTransaction {
        signatures: tx.signatures.clone(),
        instructions: dedup::deduplicate(instructions),
        addons: addons::enrich(tx),
    }
}

/// Runs both domain resolvers over a parsed instruction list. Spec §4.I
/// expects at most one to match per transaction; both fields are exposed so
/// callers can assert that invariant themselves.
pub fn resolve(parsed: &ParsedTransaction) -> ResolvedSummary {
    ResolvedSummary {
        pumpfun: resolver::resolve_pumpfun(&parsed.instructions),
        raydium: resolver::resolve_raydium(&parsed.instructions),
    }
}

/// Runs the full pipeline: normalize the raw JSON envelope, parse it into
/// events and addons, then resolve a domain summary if one applies.
pub fn decode_transaction(raw: &Value) -> Result<(ParsedTransaction, ResolvedSummary), DecodeError> {
    let tx = crate::normalizer::normalize(raw)?;
    let parsed = parse(&tx);
    let resolved = resolve(&parsed);
    Ok((parsed, resolved))
}
