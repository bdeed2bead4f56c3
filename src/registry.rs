//! Program address to decoder dispatch table (spec §4.D), grounded on
//! `soltxs/parser/__init__.py::id_to_handler` / `Program.route`.

use crate::error::InstructionDecodeError;
use crate::event::Event;
use crate::model::Transaction;
use crate::parsers::{compute_budget, mortem, pumpfun, raydium, system, token_program};
use crate::unknown_parser;

type Decoder = fn(&Transaction, &str, usize, &[u8], &str) -> Result<Event, InstructionDecodeError>;

fn lookup(program_id: &str) -> Option<Decoder> {
    match program_id {
        system::PROGRAM_ID => Some(system::decode),
        compute_budget::PROGRAM_ID => Some(compute_budget::decode),
        token_program::PROGRAM_ID => Some(token_program::decode),
        raydium::PROGRAM_ID => Some(raydium::decode),
        pumpfun::PROGRAM_ID => Some(pumpfun::decode),
        mortem::PROGRAM_ID => Some(mortem::decode),
        _ => None,
    }
}

/// Resolves `instruction.program_id_index` against the full account list
/// (account_keys plus any address-table-loaded addresses) rather than the
/// bare `account_keys` the source indexes into directly — `account_keys` is
/// always a prefix of the full list, so this is strictly more general and
/// never changes the result for transactions without lookups.
///
/// `allow_balance_inference` gates the unknown-program fallback's last-resort
/// balance-drop/rise heuristic (spec §9: "expose a flag to disable inference
/// for strict callers"); it has no effect when the program is recognized.
pub fn route(tx: &Transaction, instruction_index: usize, allow_balance_inference: bool) -> Event {
    let Some(instruction) = tx.message.instructions.get(instruction_index) else {
        return Event::Unknown(crate::event::Unknown::new(tx.signature(), "", instruction_index));
    };
    let full = tx.full_account_list();
    let program_id = full
        .get(instruction.program_id_index as usize)
        .unwrap_or_default();
    let signature = tx.signature();

    let result = match lookup(program_id) {
        Some(decode) => decode(tx, signature, instruction_index, &instruction.accounts, &instruction.data),
        None => unknown_parser::decode(tx, signature, instruction_index, program_id, allow_balance_inference),
    };

    result.unwrap_or_else(|_| Event::Unknown(crate::event::Unknown::new(signature, program_id, instruction_index)))
}
