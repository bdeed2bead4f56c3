//! The one concrete Borsh schema shared verbatim between Mortem's parser and
//! the unknown-program heuristic fallback (spec §9: "the shared `SwapData`
//! schema and the 16-byte skip must be exactly identical between them").

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, BorshDeserialize)]
pub struct SwapData {
    pub mint: Pubkey,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub is_buy: bool,
    pub user: Pubkey,
}

/// PumpFun-style inner events are anchor log records: 16 bytes of event
/// prefix, then the Borsh-encoded `SwapData`. Requires at least 48 raw bytes
/// before the skip (spec §4.E.iv / §4.F); anything shorter, or a remainder
/// that doesn't decode cleanly, yields `None` rather than an error — callers
/// simply skip the candidate.
pub fn decode_swap_data(raw: &[u8]) -> Option<SwapData> {
    if raw.len() < 48 {
        return None;
    }
    SwapData::try_from_slice(&raw[16..]).ok()
}
