//! Domain-separated SHA-256.

use sha2::{Digest, Sha256};

/// Returns a SHA-256 state primed with `SHA256(tag) ‖ SHA256(tag)`.
///
/// Callers feed the message into the returned hasher and finalize it.
pub(crate) fn tagged_hash(tag: &[u8]) -> Sha256 {
    let tag_hash = Sha256::digest(tag);
    let mut digest = Sha256::new();
    digest.update(tag_hash);
    digest.update(tag_hash);
    digest
}

/// Computes `SHA256(SHA256(tag) ‖ SHA256(tag) ‖ msg)`, the BIP340 tagged hash.
pub fn tagged_sha256(tag: &[u8], msg: &[u8]) -> [u8; 32] {
    tagged_hash(tag).chain_update(msg).finalize().into()
}

#[cfg(test)]
mod tests {
    use super::tagged_sha256;
    use hex_literal::hex;
    use sha2::{Digest, Sha256};

    #[test]
    fn matches_manual_construction() {
        let tag = b"BIP0340/challenge";
        let msg = b"message";
        let tag_hash = Sha256::digest(tag);
        let expected: [u8; 32] = Sha256::new()
            .chain_update(tag_hash)
            .chain_update(tag_hash)
            .chain_update(msg)
            .finalize()
            .into();
        assert_eq!(tagged_sha256(tag, msg), expected);
    }

    #[test]
    fn tags_separate_domains() {
        let msg = hex!("0000000000000000000000000000000000000000000000000000000000000000");
        assert_ne!(
            tagged_sha256(b"BIP0340/aux", &msg),
            tagged_sha256(b"BIP0340/nonce", &msg)
        );
    }
}
