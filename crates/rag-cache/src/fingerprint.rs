//! Cache key fingerprinting.
//!
//! The source this system was distilled from hashed cache keys with MD5;
//! spec §9 calls that out for an upgrade. SHA-256 is used here instead.

use sha2::{Digest, Sha256};

/// Fingerprint arbitrary key material (e.g. `query|provider|model`) into a
/// stable hex digest suitable as a cache key.
#[must_use]
pub fn fingerprint(material: &[u8]) -> String {
    let digest = Sha256::digest(material);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_yields_same_fingerprint() {
        assert_eq!(fingerprint(b"hello"), fingerprint(b"hello"));
    }

    #[test]
    fn different_input_yields_different_fingerprint() {
        assert_ne!(fingerprint(b"hello"), fingerprint(b"world"));
    }

    #[test]
    fn fingerprint_is_64_hex_chars() {
        let fp = fingerprint(b"hello");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
