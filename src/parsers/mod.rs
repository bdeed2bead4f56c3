//! Program-specific instruction decoders (spec §4.E). Every decoder shares
//! the signature `(tx, signature, instruction_index, accounts, raw_data) ->
//! Result<Event, InstructionDecodeError>` so `registry::dispatch` can hold
//! them in one uniform table.

pub mod compute_budget;
pub mod mortem;
pub mod pumpfun;
pub mod raydium;
pub mod system;
pub mod token_program;
