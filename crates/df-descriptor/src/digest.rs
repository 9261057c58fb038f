//! Content-based hashing for descriptors.

use sha2::{Digest, Sha256};

/// Hash the network and launch documents together.
///
/// A NUL separator keeps `("ab", "c")` and `("a", "bc")` apart.
pub fn digest_hex(network: &str, launch: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(network.as_bytes());
    hasher.update([0u8]);
    hasher.update(launch.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_stability() {
        let a = digest_hex("<network/>", "<commands/>");
        let b = digest_hex("<network/>", "<commands/>");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn digest_separates_documents() {
        assert_ne!(digest_hex("ab", "c"), digest_hex("a", "bc"));
    }
}
