//! Builder-style configuration for [`crate::facade::Vault`].
//!
//! Every knob here maps to one of the enumerated configuration keys:
//! KDF floors, the log chain's key length, and the cache's soft limits,
//! eviction policy, and fingerprint salt.

use crate::cache::EvictionPolicy;
use crate::error::{Error, Result};

const DEFAULT_KDF_MEMORY_COST_KIB: u32 = 19 * 1024;
const DEFAULT_KDF_TIME_COST: u32 = 2;
const DEFAULT_KDF_PARALLELISM: u32 = 1;
const DEFAULT_KDF_SALT_LENGTH: usize = 16;
const DEFAULT_KDF_OUTPUT_LENGTH: u32 = 32;
const DEFAULT_LOG_CHAIN_KEY_BYTES: usize = 32;
const DEFAULT_CACHE_CLEANUP_DELAY_MS: u64 = 30_000;

/// KDF-related settings.
#[derive(Debug, Clone)]
pub struct KdfConfig {
    /// Memory block count in KiB (minimum 8).
    pub memory_cost_kib: u32,
    /// Number of passes (minimum 1).
    pub time_cost: u32,
    /// Lane count (minimum 1).
    pub parallelism: u32,
    /// Bytes of salt to generate when the caller doesn't supply one.
    pub salt_length: usize,
    /// Derived-key length in bytes (16 to 1024).
    pub output_length: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: DEFAULT_KDF_MEMORY_COST_KIB,
            time_cost: DEFAULT_KDF_TIME_COST,
            parallelism: DEFAULT_KDF_PARALLELISM,
            salt_length: DEFAULT_KDF_SALT_LENGTH,
            output_length: DEFAULT_KDF_OUTPUT_LENGTH,
        }
    }
}

/// Log-chain-related settings. Canonical encoding is fixed and not
/// user-tunable.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Byte length of a freshly generated chain key.
    pub chain_key_bytes: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            chain_key_bytes: DEFAULT_LOG_CHAIN_KEY_BYTES,
        }
    }
}

/// Cache-related settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Soft upper bound on stored entries.
    pub max_entries: Option<usize>,
    /// Soft upper bound on approximate memory usage.
    pub max_memory_bytes: Option<usize>,
    /// TTL applied to entries that don't specify their own.
    pub default_ttl_ms: Option<u64>,
    /// Strategy used to pick an eviction victim.
    pub eviction_policy: EvictionPolicy,
    /// Delay before the next scheduled sweep of expired entries.
    pub cleanup_delay_ms: u64,
    /// Fixed salt mixed into every fingerprint.
    pub fingerprint_salt: Vec<u8>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            max_memory_bytes: None,
            default_ttl_ms: None,
            eviction_policy: EvictionPolicy::default(),
            cleanup_delay_ms: DEFAULT_CACHE_CLEANUP_DELAY_MS,
            fingerprint_salt: b"vaultcore-fingerprint-v1".to_vec(),
        }
    }
}

/// Top-level configuration handed to [`crate::facade::Vault::new`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// KDF settings.
    pub kdf: KdfConfig,
    /// Log chain settings.
    pub log: LogConfig,
    /// Cache settings.
    pub cache: CacheConfig,
}

impl Config {
    /// Start from defaults.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.kdf.memory_cost_kib < 8 {
            return Err(Error::invalid("kdf.memory_cost_kib", "must be >= 8"));
        }
        if self.kdf.time_cost < 1 {
            return Err(Error::invalid("kdf.time_cost", "must be >= 1"));
        }
        if self.kdf.parallelism < 1 {
            return Err(Error::invalid("kdf.parallelism", "must be >= 1"));
        }
        if self.kdf.salt_length < 8 {
            return Err(Error::invalid("kdf.salt_length", "must be >= 8"));
        }
        if !(16..=1024).contains(&self.kdf.output_length) {
            return Err(Error::invalid("kdf.output_length", "must be within [16, 1024]"));
        }
        if self.log.chain_key_bytes < 16 {
            return Err(Error::invalid("log.chain_key_bytes", "must be >= 16"));
        }
        Ok(())
    }
}

/// Fluent builder over [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set `kdf.memory_cost_kib`.
    pub fn kdf_memory_cost_kib(mut self, value: u32) -> Self {
        self.config.kdf.memory_cost_kib = value;
        self
    }

    /// Set `kdf.time_cost`.
    pub fn kdf_time_cost(mut self, value: u32) -> Self {
        self.config.kdf.time_cost = value;
        self
    }

    /// Set `kdf.parallelism`.
    pub fn kdf_parallelism(mut self, value: u32) -> Self {
        self.config.kdf.parallelism = value;
        self
    }

    /// Set `kdf.salt_length`.
    pub fn kdf_salt_length(mut self, value: usize) -> Self {
        self.config.kdf.salt_length = value;
        self
    }

    /// Set `kdf.output_length`.
    pub fn kdf_output_length(mut self, value: u32) -> Self {
        self.config.kdf.output_length = value;
        self
    }

    /// Set `log.chain_key_bytes`.
    pub fn log_chain_key_bytes(mut self, value: usize) -> Self {
        self.config.log.chain_key_bytes = value;
        self
    }

    /// Set `cache.max_entries`.
    pub fn cache_max_entries(mut self, value: usize) -> Self {
        self.config.cache.max_entries = Some(value);
        self
    }

    /// Set `cache.max_memory_bytes`.
    pub fn cache_max_memory_bytes(mut self, value: usize) -> Self {
        self.config.cache.max_memory_bytes = Some(value);
        self
    }

    /// Set `cache.default_ttl_ms`.
    pub fn cache_default_ttl_ms(mut self, value: u64) -> Self {
        self.config.cache.default_ttl_ms = Some(value);
        self
    }

    /// Set `cache.eviction_policy`.
    pub fn cache_eviction_policy(mut self, value: EvictionPolicy) -> Self {
        self.config.cache.eviction_policy = value;
        self
    }

    /// Set `cache.cleanup_delay_ms`.
    pub fn cache_cleanup_delay_ms(mut self, value: u64) -> Self {
        self.config.cache.cleanup_delay_ms = value;
        self
    }

    /// Set `cache.fingerprint_salt`.
    pub fn cache_fingerprint_salt(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.config.cache.fingerprint_salt = value.into();
        self
    }

    /// Validate and produce the final [`Config`].
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn builder_rejects_memory_cost_below_floor() {
        let result = Config::builder().kdf_memory_cost_kib(4).build();
        assert!(matches!(result, Err(Error::InvalidParams { .. })));
    }

    #[test]
    fn builder_applies_every_field() {
        let config = Config::builder()
            .kdf_memory_cost_kib(64)
            .kdf_time_cost(3)
            .kdf_parallelism(2)
            .kdf_salt_length(32)
            .kdf_output_length(64)
            .log_chain_key_bytes(32)
            .cache_max_entries(100)
            .cache_max_memory_bytes(1 << 20)
            .cache_default_ttl_ms(5_000)
            .cache_eviction_policy(EvictionPolicy::Lfu)
            .cache_cleanup_delay_ms(1_000)
            .cache_fingerprint_salt(b"custom-salt".to_vec())
            .build()
            .expect("valid configuration");

        assert_eq!(config.kdf.memory_cost_kib, 64);
        assert_eq!(config.cache.eviction_policy, EvictionPolicy::Lfu);
        assert_eq!(config.cache.fingerprint_salt, b"custom-salt");
    }
}
