//! Entropy source (Secure Core).
//!
//! TRUST LEVEL: Secure Core
//!
//! CSPRNG bytes, salts, and printable tokens. No user-supplied seeds
//! are ever accepted; the only source of randomness is the platform
//! CSPRNG via [`rand_core::OsRng`].

mod token;

pub use token::{token, Alphabet};

use rand_core::{OsRng, RngCore};

use crate::error::{Error, Result};
use crate::memory::SecureBytes;

/// Upper bound on a single token request.
pub const TOKEN_MAX_BYTES: usize = 1 << 20;

/// Draw `n` bytes from the platform CSPRNG into a zeroizing buffer.
pub fn random_bytes(n: usize) -> Result<SecureBytes> {
    let mut buf = SecureBytes::new(n);
    fill(buf.as_mut_slice())?;
    Ok(buf)
}

/// Draw `n` bytes of non-secret salt material.
///
/// Salts are not secrets, so this returns a
/// plain `Vec<u8>` rather than a zeroizing buffer.
pub fn generate_salt(n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    fill(&mut buf)?;
    Ok(buf)
}

fn fill(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|_| Error::EntropyUnavailable)
}
