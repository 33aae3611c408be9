use sha2::{Digest, Sha256};

/// SHA-256 hex digest of raw file content, used for duplicate-upload
/// detection before the expensive extract/parse steps. Deterministic and
/// independent of the filename.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint(b"resume body"), fingerprint(b"resume body"));
    }

    #[test]
    fn test_fingerprint_distinguishes_content() {
        assert_ne!(fingerprint(b"resume a"), fingerprint(b"resume b"));
    }

    #[test]
    fn test_fingerprint_is_256_bit_hex() {
        let digest = fingerprint(b"");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        // SHA-256 of the empty string is a fixed vector
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
