//! CLI entry point (spec §6): reads a JSON transaction envelope from a file
//! path or stdin, runs it through the normalize/parse/resolve pipeline, and
//! pretty-prints the result. Exit codes: 0 on success, non-zero only when
//! the envelope itself can't be normalized — per-instruction failures
//! surface as `Unknown` events, never as a process failure.

use clap::Parser;
use sol_tx_decoder::model::Transaction;
use std::io::{self, Read};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "decode_tx", about = "Decode a Solana transaction into parsed events and a domain summary")]
struct Args {
    /// Path to a JSON file holding an RPC or streaming-feed transaction envelope.
    /// Reads from stdin when omitted or passed as "-".
    path: Option<String>,

    /// Force the streaming-feed adapter instead of auto-detecting the shape.
    #[arg(long)]
    streaming: bool,

    /// Disable the unknown-program fallback's best-effort balance-drop/rise
    /// inference (spec §9's "strict caller" opt-out).
    #[arg(long)]
    no_balance_inference: bool,
}

fn read_input(args: &Args) -> io::Result<String> {
    match args.path.as_deref() {
        Some(path) if path != "-" => std::fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn normalize(args: &Args, envelope: &serde_json::Value) -> Result<Transaction, sol_tx_decoder::DecodeError> {
    if args.streaming {
        sol_tx_decoder::normalizer::streaming::normalize(envelope)
    } else {
        sol_tx_decoder::normalizer::normalize(envelope)
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let raw = match read_input(&args) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("error: failed to read input: {err}");
            return ExitCode::FAILURE;
        }
    };

    let envelope: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("error: input is not valid JSON: {err}");
            return ExitCode::FAILURE;
        }
    };

    let tx = match normalize(&args, &envelope) {
        Ok(tx) => tx,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let parsed = if args.no_balance_inference {
        sol_tx_decoder::parse_strict(&tx)
    } else {
        sol_tx_decoder::parse(&tx)
    };
    let resolved = sol_tx_decoder::resolve(&parsed);

    let output = serde_json::json!({
        "signatures": parsed.signatures,
        "instructions": parsed.instructions,
        "addons": parsed.addons,
        "resolved": {
            "pumpfun": resolved.pumpfun,
            "raydium": resolved.raydium,
        },
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: failed to serialize result: {err}");
            ExitCode::FAILURE
        }
    }
}
