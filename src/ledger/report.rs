//! Verification outcome for a log chain.

/// Result of walking a chain end to end without mutating it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationReport {
    /// Whether the chain has no tampering, no sequence gaps, and no
    /// invalid sequence numbers.
    pub valid: bool,
    /// Indices (into the chain's entry list) whose hash or linkage
    /// could not be reproduced.
    pub tampered_indices: Vec<u64>,
    /// Indices whose `seq` field does not match their position.
    pub invalid_seq_indices: Vec<u64>,
    /// Sequence numbers that should exist between the genesis and the
    /// tail but are absent, implying deletion.
    pub missing_seqs: Vec<u64>,
}
