//! Unified error taxonomy (Secure Core).
//!
//! A single tagged enum covers every failure mode exposed across
//! entropy, side-channel primitives, memory-hard KDF, the tamper-evident
//! log, and the fortified cache, per the propagation policy: parameter
//! errors surface unchanged, entropy/OOM are fatal for the operation,
//! cache compute failures are surfaced to all waiters but never cached,
//! and chain tampering is reported rather than thrown.

use crate::ledger::VerificationReport;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// The single error taxonomy shared by every component.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Caller-supplied parameters violate a stated floor or ceiling.
    #[error("invalid parameter `{which}`: {reason}")]
    InvalidParams {
        /// Name of the offending parameter.
        which: &'static str,
        /// Human-readable reason, never includes secret material.
        reason: String,
    },

    /// The platform CSPRNG failed to produce bytes.
    #[error("entropy source unavailable")]
    EntropyUnavailable,

    /// A token request exceeded the 2^20-byte ceiling.
    #[error("requested token length exceeds the 2^20-byte ceiling")]
    TokenTooLarge,

    /// Allocation failed during KDF derivation or cache eviction.
    #[error("out of memory: requested {requested_bytes} bytes")]
    OutOfMemory {
        /// Size of the allocation that failed.
        requested_bytes: u64,
    },

    /// A masked-access or parsing index fell outside its table.
    #[error("index out of bounds")]
    IndexOutOfBounds,

    /// `constant_time_modpow` was called with a non-positive modulus.
    #[error("modulus must be strictly positive")]
    InvalidModulus,

    /// `constant_time_modpow` was called with a negative exponent.
    #[error("exponent must be non-negative")]
    NegativeExponent,

    /// Chain verification found tampering; the full report is attached.
    #[error("log chain failed verification: {report:?}")]
    ChainTampered {
        /// The verification report describing what was found.
        report: VerificationReport,
    },

    /// A log import could not be parsed.
    #[error("log import failed: {reason}")]
    ImportFailed {
        /// Human-readable reason.
        reason: String,
    },

    /// The underlying cache computation exceeded its deadline.
    #[error("cache computation timed out")]
    ComputeTimeout,

    /// The underlying cache computation was cancelled by its initiator.
    #[error("cache computation was cancelled")]
    ComputeCancelled,

    /// The underlying cache computation returned an error.
    #[error("cache computation failed: {underlying}")]
    ComputeFailed {
        /// Redacted description of the underlying failure.
        underlying: String,
    },
}

impl Error {
    pub(crate) fn invalid(which: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParams {
            which,
            reason: reason.into(),
        }
    }
}
