//! Argon2id derivation, delegated to the reference `argon2` crate.
//!
//! TRUST LEVEL: Secure Core

use argon2::{Algorithm, Argon2, Params as AParams, Version};

use super::Params;
use crate::error::{Error, Result};
use crate::memory::SecureBytes;

pub fn derive(password: &[u8], params: &Params) -> Result<SecureBytes> {
    let output_len = params.output_len() as usize;

    let argon_params = AParams::new(
        params.memory_cost_kib(),
        params.time_cost(),
        params.parallelism(),
        Some(output_len),
    )
    .map_err(|e| Error::invalid("argon2id parameters", e.to_string()))?;

    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut out = SecureBytes::new(output_len);
    argon
        .hash_password_into(password, params.salt(), out.as_mut_slice())
        .map_err(|e| Error::ComputeFailed {
            underlying: e.to_string(),
        })?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::Variant;

    fn params() -> Params {
        Params::new(
            8,
            1,
            1,
            SecureBytes::copy_from_slice(b"saltsalt"),
            32,
            Variant::Argon2id,
        )
        .expect("valid params")
    }

    #[test]
    fn derives_requested_output_length() {
        let out = derive(b"password", &params()).expect("derives");
        assert_eq!(out.len(), 32);
    }

    #[test]
    fn is_deterministic_for_identical_inputs() {
        let a = derive(b"password", &params()).expect("ok");
        let b = derive(b"password", &params()).expect("ok");
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn differs_across_passwords() {
        let a = derive(b"password-one", &params()).expect("ok");
        let b = derive(b"password-two", &params()).expect("ok");
        assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn respects_requested_output_length_beyond_default() {
        let wide = Params::new(
            8,
            1,
            1,
            SecureBytes::copy_from_slice(b"saltsalt"),
            64,
            Variant::Argon2id,
        )
        .expect("valid params");
        let out = derive(b"password", &wide).expect("derives");
        assert_eq!(out.len(), 64);
    }
}
