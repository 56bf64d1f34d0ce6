//! Validated, immutable KDF parameters.

use crate::error::{Error, Result};
use crate::memory::SecureBytes;

/// Memory-hard KDF variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Argon2id, delegated to the reference `argon2` crate.
    Argon2id,
    /// Balloon hashing (Boneh–Corrigan-Gibbs–Schechter).
    Balloon,
}

const MIN_MEMORY_KIB: u32 = 8;
const MIN_TIME_COST: u32 = 1;
const MIN_PARALLELISM: u32 = 1;
const MIN_SALT_LEN: usize = 8;
const MAX_SALT_LEN: usize = 64;
const MIN_OUTPUT_LEN: u32 = 16;
const MAX_OUTPUT_LEN: u32 = 1024;

/// Validated, immutable derivation parameters.
///
/// Construction is the only place invariants are checked; once built,
/// a `Params` is guaranteed to satisfy every floor and ceiling.
#[derive(Debug)]
pub struct Params {
    memory_cost_kib: u32,
    time_cost: u32,
    parallelism: u32,
    salt: SecureBytes,
    output_len: u32,
    variant: Variant,
}

impl Params {
    /// Validate and construct derivation parameters.
    pub fn new(
        memory_cost_kib: u32,
        time_cost: u32,
        parallelism: u32,
        salt: SecureBytes,
        output_len: u32,
        variant: Variant,
    ) -> Result<Self> {
        if memory_cost_kib < MIN_MEMORY_KIB {
            return Err(Error::invalid(
                "memory_cost_kib",
                format!("must be >= {MIN_MEMORY_KIB}"),
            ));
        }
        if time_cost < MIN_TIME_COST {
            return Err(Error::invalid(
                "time_cost",
                format!("must be >= {MIN_TIME_COST}"),
            ));
        }
        if parallelism < MIN_PARALLELISM {
            return Err(Error::invalid(
                "parallelism",
                format!("must be >= {MIN_PARALLELISM}"),
            ));
        }
        if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&salt.len()) {
            return Err(Error::invalid(
                "salt",
                format!("length must be within [{MIN_SALT_LEN}, {MAX_SALT_LEN}]"),
            ));
        }
        if !(MIN_OUTPUT_LEN..=MAX_OUTPUT_LEN).contains(&output_len) {
            return Err(Error::invalid(
                "output_len",
                format!("must be within [{MIN_OUTPUT_LEN}, {MAX_OUTPUT_LEN}]"),
            ));
        }

        Ok(Self {
            memory_cost_kib,
            time_cost,
            parallelism,
            salt,
            output_len,
            variant,
        })
    }

    /// Memory cost in KiB (block count, matching the reference Argon2id
    /// semantics exactly).
    pub fn memory_cost_kib(&self) -> u32 {
        self.memory_cost_kib
    }

    /// Number of passes.
    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    /// Lane count.
    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    /// Salt bytes.
    pub fn salt(&self) -> &[u8] {
        self.salt.as_slice()
    }

    /// Requested derived-key length in bytes.
    pub fn output_len(&self) -> u32 {
        self.output_len
    }

    /// Which KDF variant these parameters target.
    pub fn variant(&self) -> Variant {
        self.variant
    }
}
