//! Address and payload codecs (component A). The normalizer is the only
//! caller of the address conversion; program parsers call `decode_payload`
//! to tolerate either wire encoding for instruction data.

use crate::error::{DecodeError, InstructionDecodeError};
use solana_sdk::pubkey::Pubkey;

/// Converts a base-64-encoded 32-byte address (as seen in streaming-feed
/// envelopes) into the base-58 string form used everywhere else in the
/// canonical model.
pub fn base64_address_to_base58(b64: &str) -> Result<String, DecodeError> {
    let raw = base64::decode(b64).map_err(|_| DecodeError::InvalidAddress(b64.to_string()))?;
    Pubkey::try_from(raw.as_slice())
        .map(|pk| pk.to_string())
        .map_err(|_| DecodeError::InvalidAddress(b64.to_string()))
}

/// Decodes an instruction payload that may arrive as either base-58 or
/// base-64 (spec §4.E): try base-58 first, fall back to base-64 on failure.
/// Never panics — callers turn the error into an Unknown event.
pub fn decode_payload(data: &str) -> Result<Vec<u8>, InstructionDecodeError> {
    if let Ok(bytes) = bs58::decode(data).into_vec() {
        return Ok(bytes);
    }
    base64::decode(data).map_err(|_| InstructionDecodeError::InvalidBase64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_payload_prefers_base58() {
        let encoded = bs58::encode(vec![9u8, 1, 2, 3]).into_string();
        let decoded = decode_payload(&encoded).unwrap();
        assert_eq!(decoded, vec![9, 1, 2, 3]);
    }

    #[test]
    fn decode_payload_falls_back_to_base64() {
        // Not valid base58 alphabet (contains '0', 'O', 'I', 'l' excluded set is fine,
        // but this string contains characters illegal in base58: '+', '/').
        let encoded = base64::encode(vec![9u8, 1, 2, 3]);
        let decoded = decode_payload(&encoded).unwrap();
        assert_eq!(decoded, vec![9, 1, 2, 3]);
    }

    #[test]
    fn base64_address_round_trips_through_base58() {
        let pk = Pubkey::new_unique();
        let b64 = base64::encode(pk.to_bytes());
        let b58 = base64_address_to_base58(&b64).unwrap();
        assert_eq!(b58, pk.to_string());
    }
}
