//! Primitive hashing and MAC (Secure Core).
//!
//! TRUST LEVEL: Secure Core
//!
//! Stateless digest and HMAC primitives used internally by the KDF
//! the log chain, and the cache's fingerprint function. Output encoding
//! (hex, base64, base32, raw) is a presentation
//! concern layered on top by callers, not this module's responsibility.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

/// SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-512 digest.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// HMAC-SHA256 over `data` keyed by `key`. HMAC accepts a key of any
/// length, so this never fails.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// HMAC-SHA512 over `data` keyed by `key`.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Optional SHA-3 family, validated against the NIST test vectors.
/// Off by default; enable the `sha3-family`
/// feature to compile it in.
#[cfg(feature = "sha3-family")]
pub mod sha3_family {
    use sha3::{Digest, Sha3_256, Sha3_512};

    /// SHA3-256 digest.
    pub fn sha3_256(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    /// SHA3-512 digest.
    pub fn sha3_512(data: &[u8]) -> [u8; 64] {
        let mut hasher = Sha3_512::new();
        hasher.update(data);
        hasher.finalize().into()
    }

}
