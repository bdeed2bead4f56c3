//! Anchor-framework instruction discriminators: the first 8 bytes of
//! `sha256("global:<method_name>")`, used by PumpFun. Mirrors the teacher's
//! own `solana::idl_parser::compute_discriminator`.

use sha2::{Digest, Sha256};

pub fn anchor_discriminator(method_name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{method_name}").as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_is_stable_per_name() {
        let buy = anchor_discriminator("buy");
        let sell = anchor_discriminator("sell");
        assert_ne!(buy, sell);
        assert_eq!(buy, anchor_discriminator("buy"));
    }
}
