use thiserror::Error;

// Fatal for the whole transaction: the normalizer gave up on the envelope shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("transaction envelope shape is not recognized by any normalizer adapter")]
    UnsupportedEncoding,
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

// Per-instruction only. Never escapes `parse`; always folded into an Unknown event.
#[derive(Debug, Error)]
pub enum InstructionDecodeError {
    #[error("invalid base58 payload")]
    InvalidBase58,
    #[error("invalid base64 payload")]
    InvalidBase64,
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("truncated instruction payload")]
    TruncatedPayload,
    #[error("unrecognized instruction discriminator")]
    UnknownDiscriminator,
    #[error("token decimals unknown for mint {0}")]
    DecimalsUnknown(String),
    #[error("no swap data found in inner instructions")]
    NoSwapDataFound,
}
