//! `SecureBytes`, the single owned, zeroizing buffer primitive.
//!
//! TRUST LEVEL: Secure Core
//!
//! FORMAL SECURITY INVARIANTS
//!
//! I1. Ownership is exclusive; there is no implicit sharing.
//! I2. `len() == capacity()` at all times, so zeroizing the logical
//!     contents on drop zeroizes the entire backing allocation; there
//!     is no spare capacity left unwiped.
//! I3. Every construction path records a length; every drop path
//!     overwrites the full allocation before it is released.
//! I4. `Clone` is explicit and itself produces a zeroizing buffer; the
//!     type is not `Copy` and does not implement `Debug` with contents.

use std::fmt;

use zeroize::Zeroize;

/// An owned, contiguous, zeroize-on-drop byte buffer.
///
/// Collapses the `SecureObject` / `SecureString` / `SecureBuffer`
/// inheritance trinity into one primitive, per the design notes on
/// dynamic-language secret wrappers: a single owned buffer plus typed
/// wrappers elsewhere that record intended interpretation.
#[must_use = "secrets must be held and explicitly wiped or dropped"]
pub struct SecureBytes {
    inner: Vec<u8>,
}

impl SecureBytes {
    /// Allocate a new zero-filled buffer of exactly `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            inner: vec![0u8; len],
        }
    }

    /// Take ownership of `bytes`. The caller's binding is consumed by
    /// the move; any further copy the caller still holds is the
    /// caller's responsibility to wipe with [`secure_wipe`](super::secure_wipe).
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { inner: bytes }
    }

    /// Copy `bytes` into a new secure buffer without taking ownership
    /// of the source. Prefer [`SecureBytes::from_vec`] when the caller
    /// can give up ownership instead.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self {
            inner: bytes.to_vec(),
        }
    }

    /// Number of bytes held.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Read-only view. The borrow cannot outlive `self`.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Exclusive mutable view. The borrow cannot outlive `self`.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.inner
    }

    /// Immediately overwrite the contents with zeros. After this call
    /// the buffer is still valid (same length), just all-zero.
    pub fn wipe_now(&mut self) {
        self.inner.zeroize();
    }

    /// Produce an explicit zeroizing clone. Cloning is never implicit:
    /// callers must write `secret.clone_secure()`, not `secret.clone()`.
    pub fn clone_secure(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.inner.zeroize();
        #[cfg(test)]
        test_support::record_drop(&self.inner);
    }
}

/// Test-mode inspector: a real freed-memory reuse
/// inspector is unsafe and this crate forbids `unsafe_code`, so the
/// inspector instead snapshots the buffer's contents at the moment
/// `Drop` runs, after `zeroize()` but before deallocation, the last
/// point the bytes are observable at all. Tests assert the snapshot is
/// all-zero.
#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;

    thread_local! {
        static LAST_DROPPED: RefCell<Option<Vec<u8>>> = const { RefCell::new(None) };
    }

    pub(crate) fn record_drop(bytes: &[u8]) {
        LAST_DROPPED.with(|cell| *cell.borrow_mut() = Some(bytes.to_vec()));
    }

    /// Snapshot of the most recently dropped `SecureBytes` on this thread.
    pub fn last_dropped() -> Option<Vec<u8>> {
        LAST_DROPPED.with(|cell| cell.borrow().clone())
    }
}

impl fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureBytes(<{} bytes redacted>)", self.inner.len())
    }
}
