use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest of a subscription's raw response body.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest of a complete in-memory body. Streaming callers feed a `Sha256` directly.
    pub fn of(content: &[u8]) -> Self {
        Self::from_hasher(Sha256::new_with_prefix(content))
    }

    pub(crate) fn from_hasher(hasher: Sha256) -> Self {
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_same_fingerprint() {
        assert_eq!(Fingerprint::of(b"example.com\n"), Fingerprint::of(b"example.com\n"));
        assert_ne!(Fingerprint::of(b"example.com\n"), Fingerprint::of(b"example.org\n"));
    }

    #[test]
    fn test_display_is_hex() {
        let fp = Fingerprint::of(b"");
        assert_eq!(
            fp.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
