//! Content fingerprinting using blake3.
//!
//! Fingerprints depend on file content only, never on path or mtime, so
//! unchanged content always maps to the same hashed filename.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let fp = hash::fingerprint(b"console.log(1)", 10); // -> "a1b2c3d4e5"
//! let fp = hash::fingerprint_reader(file, 10)?;
//! ```

use std::io::{self, Read};

/// Default fingerprint length in hex chars.
pub const DEFAULT_LEN: usize = 10;

/// Accepted fingerprint lengths (a blake3 digest has 64 hex chars).
pub const MIN_LEN: usize = 6;
pub const MAX_LEN: usize = 64;

/// Compute a hex fingerprint of `len` chars from byte data.
///
/// `len` is clamped to [`MAX_LEN`].
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T, len: usize) -> String {
    let hash = blake3::hash(data.as_ref());
    truncate(hex::encode(hash.as_bytes()), len)
}

/// Compute a fingerprint from a reader (streaming, for large files).
pub fn fingerprint_reader(mut reader: impl Read, len: usize) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }
    Ok(truncate(hex::encode(hasher.finalize().as_bytes()), len))
}

fn truncate(mut hex: String, len: usize) -> String {
    hex.truncate(len.min(MAX_LEN));
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_length() {
        assert_eq!(fingerprint("body {}", DEFAULT_LEN).len(), 10);
        assert_eq!(fingerprint("body {}", 8).len(), 8);
        assert_eq!(fingerprint("body {}", 1000).len(), MAX_LEN);
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint("console.log(1)", DEFAULT_LEN);
        let b = fingerprint("console.log(1)", DEFAULT_LEN);
        assert_eq!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let c = fingerprint("console.log(2)", DEFAULT_LEN);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fingerprint_reader_matches_bytes() {
        let content = "x".repeat(200 * 1024);
        let streamed = fingerprint_reader(content.as_bytes(), DEFAULT_LEN).unwrap();
        assert_eq!(streamed, fingerprint(&content, DEFAULT_LEN));
    }
}
