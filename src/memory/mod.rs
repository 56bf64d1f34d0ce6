//! Memory safety and zeroization foundation (Secure Core).
//!
//! This module is the root of the trusted dependency graph: the KDF,
//! log chain, and cache all depend on the guarantees enforced here.
//!
//! FORMAL SECURITY INVARIANTS (NON-NEGOTIABLE)
//!
//! I1. Secret material is heap-allocated, never a bare stack array.
//! I2. Secret material is deterministically zeroized on every drop path.
//! I3. Ownership is exclusive; sharing requires an explicit, zeroizing clone.
//! I4. Public APIs never expose `unsafe` memory access.
//!
//! Any violation of these invariants is a security bug.

mod secure_bytes;
mod wipe;

pub use secure_bytes::SecureBytes;
pub use wipe::{secure_wipe, with_secret};
