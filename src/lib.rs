#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::all)]
#![forbid(unsafe_code)]

//! vaultcore: defense-in-depth cryptographic primitives.
//!
//! Entropy, memory-hard key derivation, side-channel-resistant
//! comparisons, zeroizing secure memory, a tamper-evident append-only
//! log, and a fingerprint-keyed compute cache, unified behind a single
//! façade in [`facade`].
//!
//! No UI. No network. No plaintext persistence.

pub mod cache;
pub mod config;
pub mod entropy;
pub mod error;
pub mod facade;
pub mod hash;
pub mod kdf;
pub mod ledger;
pub mod memory;
pub mod sidechannel;

pub use error::{Error, Result};
pub use facade::Vault;
