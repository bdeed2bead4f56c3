//! Collapses duplicate Buy/Sell/Swap events (spec §4.H), grounded on
//! `soltxs/parser/__init__.py::deduplicate_instructions`. Order-preserving;
//! all other event kinds pass through unconditionally.

use crate::event::{BuySell, Event, Swap};
use std::collections::HashSet;

#[derive(PartialEq, Eq, Hash)]
struct DedupKey {
    signature: String,
    instruction_name: String,
    who: String,
    from_token: String,
    to_token: String,
    from_token_decimals: u8,
    to_token_decimals: u8,
    from_token_amount: u64,
    to_token_amount: u64,
}

fn key_for(event: &Event) -> Option<DedupKey> {
    match event {
        Event::BuySell(BuySell {
            signature,
            who,
            from_token,
            to_token,
            from_token_decimals,
            to_token_decimals,
            from_token_amount,
            to_token_amount,
            ..
        }) => Some(DedupKey {
            signature: signature.clone(),
            instruction_name: match event {
                Event::BuySell(b) => b.instruction_name().to_string(),
                _ => unreachable!(),
            },
            who: who.clone(),
            from_token: from_token.clone(),
            to_token: to_token.clone(),
            from_token_decimals: *from_token_decimals,
            to_token_decimals: *to_token_decimals,
            from_token_amount: *from_token_amount,
            to_token_amount: *to_token_amount,
        }),
        Event::Swap(Swap {
            signature,
            who,
            from_token,
            to_token,
            from_token_decimals,
            to_token_decimals,
            from_token_amount,
            to_token_amount,
            ..
        }) => Some(DedupKey {
            signature: signature.clone(),
            instruction_name: "Swap".to_string(),
            who: who.clone(),
            from_token: from_token.clone(),
            to_token: to_token.clone(),
            from_token_decimals: *from_token_decimals,
            to_token_decimals: *to_token_decimals,
            from_token_amount: *from_token_amount,
            to_token_amount: *to_token_amount,
        }),
        _ => None,
    }
}

/// Flattens nothing (the Rust pipeline never produces nested event lists),
/// drops nothing (there's no `Option<Event>` in the list by the time this
/// runs), and keeps only the first occurrence of each Buy/Sell/Swap key.
pub fn deduplicate(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(events.len());
    for event in events {
        match key_for(&event) {
            Some(key) => {
                if seen.insert(key) {
                    out.push(event);
                }
            }
            None => out.push(event),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TradeKind;

    fn buy(signature: &str, amount: u64) -> Event {
        Event::BuySell(BuySell {
            kind: TradeKind::Buy,
            signature: signature.to_string(),
            program_id: "prog".into(),
            program_name: "PumpFun".into(),
            who: "wallet".into(),
            from_token: "WSOL".into(),
            from_token_decimals: 9,
            to_token: "mint".into(),
            to_token_decimals: 6,
            from_token_amount: amount,
            to_token_amount: amount,
            pre_token_balance: None,
            post_token_balance: None,
            pre_sol_balance: None,
            post_sol_balance: None,
        })
    }

    #[test]
    fn collapses_identical_buys_keeping_first() {
        let events = vec![buy("sig1", 100), buy("sig1", 100), buy("sig1", 200)];
        let out = deduplicate(events);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn is_idempotent() {
        let events = vec![buy("sig1", 100), buy("sig1", 100)];
        let once = deduplicate(events);
        let twice = deduplicate(once.clone());
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn non_trade_events_always_pass_through() {
        let u1 = Event::Unknown(crate::event::Unknown::new("sig1", "prog", 0));
        let u2 = Event::Unknown(crate::event::Unknown::new("sig1", "prog", 0));
        let out = deduplicate(vec![u1, u2]);
        assert_eq!(out.len(), 2);
    }
}
