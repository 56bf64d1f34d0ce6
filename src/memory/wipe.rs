//! Secure wipe and scoped-secret helpers (Secure Core).

use zeroize::Zeroize;

use super::SecureBytes;

/// Overwrite `buffer[start..end]` with zero bytes using an operation
/// the compiler is forbidden to elide (`zeroize::Zeroize`, which is
/// built specifically to survive dead-store optimization).
///
/// `end` is clamped to `buffer.len()` rather than rejected, so a
/// caller's end-of-buffer-or-beyond intent still wipes what exists.
///
/// Calling this twice over the same range is idempotent: the second
/// call has no additional observable effect.
pub fn secure_wipe(buffer: &mut [u8], start: usize, end: usize) {
    let end = end.min(buffer.len());
    if start >= end {
        return;
    }
    buffer[start..end].zeroize();
}

/// Allocate a `SecureBytes` from `initial`, hand a read-only view to
/// `body`, and guarantee the buffer is wiped on every exit path,
/// including `body` panicking, since `SecureBytes::drop` runs during
/// unwind just as it does on a normal return.
pub fn with_secret<T>(initial: Vec<u8>, body: impl FnOnce(&[u8]) -> T) -> T {
    let secret = SecureBytes::from_vec(initial);
    body(secret.as_slice())
}
