//! Hashing utilities using FxHash.
//!
//! Used to detect configuration reloads that change nothing.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_is_deterministic() {
        assert_eq!(compute("[serve]\nport = 8080"), compute("[serve]\nport = 8080"));
        assert_ne!(compute("[serve]\nport = 8080"), compute("[serve]\nport = 8081"));
        assert_eq!(compute(b"abc".as_slice()), compute("abc"));
    }
}
