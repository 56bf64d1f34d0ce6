//! Memory-hard key derivation engine (Secure Core).
//!
//! TRUST LEVEL: Secure Core
//!
//! Two variants, Argon2id and Balloon, share one output shape and one
//! parameter-floor validation path. Argon2id delegates to the
//! vetted reference implementation; Balloon is hand-rolled per
//! Boneh-Corrigan-Gibbs-Schechter; there is no equivalent audited
//! crate in this ecosystem for it to delegate to.

mod argon2id;
mod balloon;
mod params;

pub use params::{Params, Variant};

use std::time::Instant;

use tracing::debug;

use crate::error::Result;
use crate::memory::SecureBytes;

/// Result of a derivation: the key plus enough metadata to audit the
/// call without ever exposing the key bytes in a log.
pub struct Output {
    key: SecureBytes,
    salt_copy: Vec<u8>,
    params: Params,
    timing_ms: u64,
    memory_peak_bytes: u64,
}

impl Output {
    /// The derived key. Consumers destroy it explicitly or rely on drop.
    pub fn key(&self) -> &SecureBytes {
        &self.key
    }

    /// Take ownership of the derived key.
    pub fn into_key(self) -> SecureBytes {
        self.key
    }

    /// A non-secret copy of the salt that was used.
    pub fn salt_copy(&self) -> &[u8] {
        &self.salt_copy
    }

    /// The parameters this output was derived under.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Wall-clock milliseconds spent computing the derivation.
    pub fn timing_ms(&self) -> u64 {
        self.timing_ms
    }

    /// Peak memory footprint of the derivation, in bytes.
    pub fn memory_peak_bytes(&self) -> u64 {
        self.memory_peak_bytes
    }
}

/// Derive a key using whichever variant `params` names. Both
/// `derive_argon2id` and `derive_balloon` fall through to this uniform
/// interface after fixing the variant.
pub fn derive(password: &[u8], params: Params) -> Result<Output> {
    match params.variant() {
        Variant::Argon2id => derive_argon2id(password, params),
        Variant::Balloon => derive_balloon(password, params),
    }
}

/// Derive a key with Argon2id. Produces byte-identical output to the
/// reference Argon2id specification for identical inputs.
pub fn derive_argon2id(password: &[u8], params: Params) -> Result<Output> {
    let started = Instant::now();
    let key = argon2id::derive(password, &params)?;
    let elapsed = started.elapsed();
    debug!(
        memory_cost_kib = params.memory_cost_kib(),
        time_cost = params.time_cost(),
        output_len = params.output_len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "argon2id derivation complete"
    );
    let memory_peak_bytes = u64::from(params.memory_cost_kib()) * 1024;
    Ok(finish(key, params, elapsed.as_millis() as u64, memory_peak_bytes))
}

/// Derive a key with Balloon hashing.
pub fn derive_balloon(password: &[u8], params: Params) -> Result<Output> {
    let started = Instant::now();
    let (key, block_count) = balloon::derive(password, &params)?;
    let elapsed = started.elapsed();
    debug!(
        memory_cost_kib = params.memory_cost_kib(),
        time_cost = params.time_cost(),
        output_len = params.output_len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "balloon derivation complete"
    );
    let memory_peak_bytes = block_count as u64 * balloon::BLOCK_SIZE as u64;
    Ok(finish(key, params, elapsed.as_millis() as u64, memory_peak_bytes))
}

fn finish(key: SecureBytes, params: Params, timing_ms: u64, memory_peak_bytes: u64) -> Output {
    let salt_copy = params.salt().to_vec();
    Output {
        key,
        salt_copy,
        params,
        timing_ms,
        memory_peak_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(memory_cost_kib: u32, variant: Variant) -> Params {
        Params::new(
            memory_cost_kib,
            2,
            1,
            SecureBytes::copy_from_slice(b"saltsalt"),
            32,
            variant,
        )
        .expect("valid params")
    }

    #[test]
    fn argon2id_is_deterministic() {
        let a = derive_argon2id(b"password", params(8, Variant::Argon2id)).expect("ok");
        let b = derive_argon2id(b"password", params(8, Variant::Argon2id)).expect("ok");
        assert_eq!(a.key().as_slice(), b.key().as_slice());
    }

    #[test]
    fn balloon_is_deterministic() {
        let a = derive_balloon(b"password", params(256, Variant::Balloon)).expect("ok");
        let b = derive_balloon(b"password", params(256, Variant::Balloon)).expect("ok");
        assert_eq!(a.key().as_slice(), b.key().as_slice());
    }

    #[test]
    fn dispatcher_matches_direct_call() {
        let direct = derive_argon2id(b"password", params(8, Variant::Argon2id)).expect("ok");
        let dispatched = derive(b"password", params(8, Variant::Argon2id)).expect("ok");
        assert_eq!(direct.key().as_slice(), dispatched.key().as_slice());
    }
}
