//! Decodes Solana transactions — either RPC-JSON replies or streaming-feed
//! envelopes — into a canonical model, routes each instruction through a
//! per-program decoder or a heuristic fallback, and optionally reduces the
//! result to a single PumpFun or Raydium trade summary.

pub mod addons;
pub mod codec;
pub mod dedup;
pub mod discriminator;
pub mod error;
pub mod event;
pub mod model;
pub mod normalizer;
pub mod orchestrate;
pub mod parsers;
pub mod registry;
pub mod resolver;
pub mod swap_data;
pub mod unknown_parser;

pub use error::{DecodeError, InstructionDecodeError};
pub use event::Event;
pub use model::Transaction;
pub use orchestrate::{decode_transaction, parse, parse_strict, resolve, ParsedTransaction, ResolvedSummary};
