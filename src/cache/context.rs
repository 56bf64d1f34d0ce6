//! Per-call audit scope for cache operations (Secure Core boundary).

use std::time::{SystemTime, UNIX_EPOCH};

use crate::entropy;
use crate::memory::SecureBytes;

/// How long after `started_at` this scope's held resources must be
/// cleaned up if the call somehow never returns normally.
const CLEANUP_WINDOW_MS: u64 = 60_000;

/// Per-call audit scope: an identity, a start time, a digest of the
/// (non-secret) parameters the call was invoked with, and the deadline
/// by which its resources must be cleaned up. Any [`SecureBytes`]
/// temporarily held for the duration of a call is parked here so it is
/// guaranteed to be wiped when the context drops, on every exit path
/// including an early `?`.
///
/// Created by [`crate::facade::Vault::cache_get_or_compute`] and
/// destroyed once the result is either cached or returned, on every
/// path.
pub struct ExecutionContext {
    execution_id: [u8; 16],
    started_at: u64,
    parameter_digest: [u8; 32],
    cleanup_deadline: u64,
    audit_flags: Vec<&'static str>,
    secure_buffers: Vec<SecureBytes>,
}

impl ExecutionContext {
    pub(crate) fn start(operation: &'static str, parameter_digest: [u8; 32]) -> Self {
        let execution_id = random_id();
        let started_at = now_unix_ms();
        tracing::trace!(operation, started_at, "execution context opened");
        Self {
            execution_id,
            started_at,
            parameter_digest,
            cleanup_deadline: started_at + CLEANUP_WINDOW_MS,
            audit_flags: vec![operation],
            secure_buffers: Vec::new(),
        }
    }

    /// Identity assigned to this call.
    pub fn execution_id(&self) -> [u8; 16] {
        self.execution_id
    }

    /// When this call began, in milliseconds since the Unix epoch.
    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    /// Digest of the call's non-secret parameters.
    pub fn parameter_digest(&self) -> [u8; 32] {
        self.parameter_digest
    }

    /// Deadline, in milliseconds since the Unix epoch, by which this
    /// call's held resources must be cleaned up.
    pub fn cleanup_deadline(&self) -> u64 {
        self.cleanup_deadline
    }

    /// Markers recorded over the life of this call, for audit.
    pub fn audit_flags(&self) -> &[&'static str] {
        &self.audit_flags
    }

    pub(crate) fn note(&mut self, flag: &'static str) {
        self.audit_flags.push(flag);
    }

    /// Park a secret buffer for the remainder of this call's scope.
    /// Dropping the context (on any exit path) wipes it.
    pub(crate) fn hold(&mut self, buf: SecureBytes) {
        self.secure_buffers.push(buf);
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        let elapsed_ms = now_unix_ms().saturating_sub(self.started_at);
        tracing::trace!(
            elapsed_ms,
            flags = ?self.audit_flags,
            held_buffers = self.secure_buffers.len(),
            "execution context closed"
        );
    }
}

fn random_id() -> [u8; 16] {
    match entropy::random_bytes(16) {
        Ok(bytes) => bytes.as_slice().try_into().expect("16 bytes"),
        Err(_) => {
            tracing::warn!("falling back to a zeroed execution id after an entropy failure");
            [0u8; 16]
        }
    }
}

fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock predates the Unix epoch")
        .as_millis() as u64
}
