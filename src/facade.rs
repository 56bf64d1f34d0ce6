//! Unified façade over every component (Secure Core boundary).
//!
//! [`Vault`] is the single entry point a consumer needs: entropy,
//! hashing, side-channel-safe comparisons, secure memory, the
//! memory-hard KDF, a tamper-evident log chain, and a fortified cache,
//! each call wrapped in a tracing span for audit visibility.

use std::sync::Arc;

use tracing::info_span;

use crate::cache::{Arg, Cache, ExecutionContext};
use crate::config::Config;
use crate::entropy::{self, Alphabet};
use crate::error::Result;
use crate::hash;
use crate::kdf::{self, Output, Params, Variant};
use crate::ledger::Chain;
use crate::memory::{self, SecureBytes};
use crate::sidechannel;

use num_bigint::{BigInt, BigUint};

/// The unified cryptographic toolkit surface.
pub struct Vault {
    config: Config,
    cache: Arc<Cache<Arg>>,
}

impl Vault {
    /// Build a façade over validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(Cache::new(
            config.cache.max_entries,
            config.cache.max_memory_bytes,
            config.cache.default_ttl_ms,
            config.cache.eviction_policy,
            config.cache.fingerprint_salt.clone(),
        ));
        Cache::spawn_cleanup_sweeper(&cache, config.cache.cleanup_delay_ms);
        Ok(Self { config, cache })
    }

    /// This façade's effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---- C1: Entropy Source ------------------------------------------

    /// Draw `len` CSPRNG bytes.
    pub fn random_bytes(&self, len: usize) -> Result<SecureBytes> {
        let _span = info_span!("vault.random_bytes", len).entered();
        entropy::random_bytes(len)
    }

    /// Draw a non-secret salt of `len` bytes.
    pub fn generate_salt(&self, len: usize) -> Result<Vec<u8>> {
        let _span = info_span!("vault.generate_salt", len).entered();
        entropy::generate_salt(len)
    }

    /// Generate a printable token of `len` characters drawn from
    /// `alphabet` with uniform-distribution rejection sampling.
    pub fn generate_token(&self, len: usize, alphabet: &Alphabet) -> Result<String> {
        let _span = info_span!("vault.generate_token", len).entered();
        entropy::token(len, alphabet)
    }

    // ---- C2: Primitive Hash --------------------------------------------

    /// SHA-256 digest.
    pub fn sha256(&self, data: &[u8]) -> [u8; 32] {
        hash::sha256(data)
    }

    /// SHA-512 digest.
    pub fn sha512(&self, data: &[u8]) -> [u8; 64] {
        hash::sha512(data)
    }

    // ---- C3: Side-Channel Primitives -----------------------------------

    /// Constant-time byte equality.
    pub fn constant_time_eq(&self, a: &[u8], b: &[u8]) -> bool {
        sidechannel::constant_time_eq(a, b)
    }

    /// Triple-redundant, fault-resistant byte equality.
    pub fn fault_resistant_eq(&self, a: &[u8], b: &[u8]) -> bool {
        sidechannel::fault_resistant_eq(a, b)
    }

    /// Montgomery-ladder modular exponentiation.
    pub fn constant_time_modpow(&self, base: &BigInt, exp: &BigInt, modulus: &BigInt) -> Result<BigUint> {
        sidechannel::constant_time_modpow(base, exp, modulus)
    }

    // ---- C4: Secure Memory ----------------------------------------------

    /// Allocate a zeroing buffer of `len` bytes.
    pub fn secure_bytes_new(&self, len: usize) -> SecureBytes {
        SecureBytes::new(len)
    }

    /// Overwrite `buffer[start..end]` with zero bytes.
    pub fn secure_wipe(&self, buffer: &mut [u8], start: usize, end: usize) {
        memory::secure_wipe(buffer, start, end)
    }

    /// Hand `body` a read-only view of a scoped secret, wiping it on
    /// every exit path including a panic unwind.
    pub fn with_secret<T>(&self, initial: Vec<u8>, body: impl FnOnce(&[u8]) -> T) -> T {
        memory::with_secret(initial, body)
    }

    // ---- C5: Memory-Hard KDF ---------------------------------------------

    /// Derive a key with Argon2id.
    pub fn derive_argon2id(&self, password: &[u8], params: Params) -> Result<Output> {
        let mut ctx = ExecutionContext::start("derive_argon2id", hash::sha256(password));
        ctx.note("kdf:argon2id");
        let output = kdf::derive_argon2id(password, params)?;
        ctx.hold(SecureBytes::copy_from_slice(output.key().as_slice()));
        Ok(output)
    }

    /// Derive a key with Balloon hashing.
    pub fn derive_balloon(&self, password: &[u8], params: Params) -> Result<Output> {
        let mut ctx = ExecutionContext::start("derive_balloon", hash::sha256(password));
        ctx.note("kdf:balloon");
        let output = kdf::derive_balloon(password, params)?;
        ctx.hold(SecureBytes::copy_from_slice(output.key().as_slice()));
        Ok(output)
    }

    /// Build KDF parameters from this façade's configured defaults,
    /// generating a fresh salt of the configured length.
    pub fn default_kdf_params(&self, variant: Variant) -> Result<Params> {
        let salt = entropy::random_bytes(self.config.kdf.salt_length)?;
        Params::new(
            self.config.kdf.memory_cost_kib,
            self.config.kdf.time_cost,
            self.config.kdf.parallelism,
            salt,
            self.config.kdf.output_length,
            variant,
        )
    }

    // ---- C6: Tamper-Evident Log Chain ------------------------------------

    /// Start a new log chain. Generates a chain key of the configured
    /// length when `key` is not supplied.
    pub fn log_chain_new(&self, key: Option<SecureBytes>) -> Result<Chain> {
        let key = match key {
            Some(key) => key,
            None => entropy::random_bytes(self.config.log.chain_key_bytes)?,
        };
        Ok(Chain::new(key))
    }

    // ---- C7: Fortified Cache ----------------------------------------------

    /// Look up a previously computed value by fingerprint.
    pub fn cache_get(&self, fp: [u8; 32]) -> Option<Arg> {
        self.cache.get(fp)
    }

    /// Fingerprint `args` under this façade's fixed cache salt.
    pub fn cache_fingerprint(&self, args: &[Arg]) -> [u8; 32] {
        self.cache.fingerprint(args)
    }

    /// Fetch or compute the value for `args`, with at-most-once
    /// concurrent computation per fingerprint. Runs under an
    /// [`ExecutionContext`] scoped to this single call, destroyed the
    /// moment the result is cached or returned on every exit path.
    pub fn cache_get_or_compute(
        &self,
        args: &[Arg],
        ttl_ms: Option<u64>,
        compute: impl FnOnce() -> Result<Arg>,
    ) -> Result<Arg> {
        let fp = self.cache.fingerprint(args);
        let mut ctx = ExecutionContext::start("cache_get_or_compute", fp);
        ctx.note("cache:get_or_compute");
        let result = self.cache.get_or_compute(args, ttl_ms, compute);
        if let Ok(Arg::Bytes(bytes)) = &result {
            ctx.hold(SecureBytes::copy_from_slice(bytes));
        }
        result
    }

    /// Remove a single cached entry.
    pub fn cache_invalidate(&self, fp: [u8; 32]) {
        self.cache.invalidate(fp);
    }

    /// Remove every cached entry.
    pub fn cache_clear(&self) {
        self.cache.clear();
    }

    /// Number of entries currently cached.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Level;

    fn vault() -> Vault {
        Vault::new(Config::default()).expect("default config is valid")
    }

    #[test]
    fn random_bytes_returns_requested_length() {
        let v = vault();
        let buf = v.random_bytes(32).expect("entropy available");
        assert_eq!(buf.len(), 32);
    }

    #[test]
    fn constant_time_eq_roundtrips_through_the_facade() {
        let v = vault();
        assert!(v.constant_time_eq(b"same", b"same"));
        assert!(!v.constant_time_eq(b"same", b"diff"));
    }

    #[test]
    fn kdf_with_default_params_is_deterministic() {
        let v = vault();
        let params_a = Params::new(8, 1, 1, SecureBytes::copy_from_slice(b"saltsalt"), 32, Variant::Argon2id)
            .expect("valid");
        let params_b = Params::new(8, 1, 1, SecureBytes::copy_from_slice(b"saltsalt"), 32, Variant::Argon2id)
            .expect("valid");
        let a = v.derive_argon2id(b"password", params_a).expect("ok");
        let b = v.derive_argon2id(b"password", params_b).expect("ok");
        assert_eq!(a.key().as_slice(), b.key().as_slice());
    }

    #[test]
    fn log_chain_round_trips_through_the_facade() {
        let v = vault();
        let mut chain = v.log_chain_new(None).expect("entropy available");
        chain.append(Level::Info, "hello", None).expect("ok");
        assert!(chain.verify().valid);
    }

    #[test]
    fn cache_get_or_compute_memoizes() {
        let v = vault();
        let args = [Arg::Str("key".to_string())];
        let first = v
            .cache_get_or_compute(&args, None, || Ok(Arg::Int(1)))
            .expect("ok");
        let second = v
            .cache_get_or_compute(&args, None, || Ok(Arg::Int(2)))
            .expect("ok");
        assert_eq!(first, second);
    }

    #[test]
    fn cache_invalidate_forces_recompute() {
        let v = vault();
        let args = [Arg::Str("key".to_string())];
        v.cache_get_or_compute(&args, None, || Ok(Arg::Int(1))).expect("ok");
        v.cache_invalidate(v.cache_fingerprint(&args));
        let recomputed = v
            .cache_get_or_compute(&args, None, || Ok(Arg::Int(2)))
            .expect("ok");
        assert_eq!(recomputed, Arg::Int(2));
    }
}
