//! Hash-chained append-only log (Secure Core).
//!
//! TRUST LEVEL: Secure Core
//!
//! Each entry's hash covers its own fields plus the previous entry's
//! hash, under an HMAC keyed by the chain's secret. Verification
//! re-derives every hash and reports exactly what it found without
//! mutating the chain.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::entropy;
use crate::error::{Error, Result};
use crate::hash::hmac_sha256;
use crate::memory::SecureBytes;
use crate::sidechannel::constant_time_eq;

use super::entry::{Level, LogEntry};
use super::report::VerificationReport;

const GENESIS_PREV_HASH: [u8; 32] = [0u8; 32];
const MAGIC: &[u8; 8] = b"VCLOG001";

/// A hash-chained, append-only log keyed by a secret chain key.
///
/// Construction always yields an active chain: a fresh `Chain` carries
/// a genesis entry at `seq = 0` whose `prev_hash` is all zero.
pub struct Chain {
    chain_key: SecureBytes,
    entries: Vec<LogEntry>,
}

impl Chain {
    /// Start a new chain under `chain_key`, inserting the genesis entry.
    pub fn new(chain_key: SecureBytes) -> Self {
        let mut chain = Self {
            chain_key,
            entries: Vec::new(),
        };
        chain.push_entry(0, GENESIS_PREV_HASH, Level::Info, "genesis".to_string(), None);
        chain
    }

    /// Append a new entry after the current tail.
    pub fn append(&mut self, level: Level, message: impl Into<String>, data: Option<String>) -> Result<&LogEntry> {
        let tail = self.entries.last().expect("chain always has a genesis entry");
        let seq = tail.seq + 1;
        let prev_hash = tail.hash;
        self.push_entry(seq, prev_hash, level, message.into(), data);
        Ok(self.entries.last().expect("just pushed"))
    }

    /// The current number of entries, including genesis.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain holds only its genesis entry.
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Read-only view of every entry in order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The most recently appended entry's hash.
    pub fn tail_hash(&self) -> [u8; 32] {
        self.entries.last().expect("chain always has a genesis entry").hash
    }

    /// The sequence number the next appended entry will carry.
    pub fn next_seq(&self) -> u64 {
        self.entries.last().expect("chain always has a genesis entry").seq + 1
    }

    /// Recompute every entry's hash and linkage without mutating the chain.
    pub fn verify(&self) -> VerificationReport {
        let mut tampered = Vec::new();
        let mut invalid_seq = Vec::new();

        // `expected_prev` carries the *recomputed* hash of the previous
        // entry forward, not its stored field, so tampering an entry's
        // content (without updating its own `hash`) still breaks the
        // link for everything after it.
        let mut expected_prev = GENESIS_PREV_HASH;
        for (i, entry) in self.entries.iter().enumerate() {
            let expected_hash = self.compute_hash(entry);

            let prev_ok = constant_time_eq(&entry.prev_hash, &expected_prev);
            let hash_ok = constant_time_eq(&entry.hash, &expected_hash);
            if !prev_ok || !hash_ok {
                tampered.push(i as u64);
            }
            expected_prev = expected_hash;

            let expected_seq = self.entries[0].seq + i as u64;
            if entry.seq != expected_seq {
                invalid_seq.push(i as u64);
            }
        }

        let missing_seqs = self.missing_seqs();
        let valid = tampered.is_empty() && invalid_seq.is_empty() && missing_seqs.is_empty();

        VerificationReport {
            valid,
            tampered_indices: tampered,
            invalid_seq_indices: invalid_seq,
            missing_seqs,
        }
    }

    /// Drop every entry and re-seed a fresh genesis.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.push_entry(0, GENESIS_PREV_HASH, Level::Info, "genesis".to_string(), None);
    }

    /// Serialize the entire entry list. The chain key is never exported.
    pub fn export(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&(self.entries.len() as u64).to_le_bytes());
        for entry in &self.entries {
            write_entry(&mut out, entry);
        }
        out
    }

    /// Replace this chain's entries with ones parsed from `bytes`,
    /// optionally verifying the result before accepting it.
    pub fn import(chain_key: SecureBytes, bytes: &[u8], verify_after: bool) -> Result<Self> {
        let entries = parse_entries(bytes)?;
        if entries.is_empty() {
            return Err(Error::ImportFailed {
                reason: "chain must contain at least a genesis entry".to_string(),
            });
        }
        let chain = Self { chain_key, entries };
        if verify_after {
            let report = chain.verify();
            if !report.valid {
                return Err(Error::ChainTampered { report });
            }
        }
        Ok(chain)
    }

    fn push_entry(&mut self, seq: u64, prev_hash: [u8; 32], level: Level, message: String, data: Option<String>) {
        let id = random_id();
        let timestamp_unix_ms = now_unix_ms();
        let mut entry = LogEntry {
            id,
            seq,
            timestamp_unix_ms,
            level,
            message,
            data,
            prev_hash,
            hash: [0u8; 32],
        };
        entry.hash = self.compute_hash(&entry);
        self.entries.push(entry);
    }

    fn compute_hash(&self, entry: &LogEntry) -> [u8; 32] {
        let encoded = canonical_encode(entry);
        hmac_sha256(self.chain_key.as_slice(), &encoded)
    }

    fn missing_seqs(&self) -> Vec<u64> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let present: BTreeSet<u64> = self.entries.iter().map(|e| e.seq).collect();
        let first = self.entries[0].seq;
        let last = self.entries[self.entries.len() - 1].seq;
        (first..=last).filter(|seq| !present.contains(seq)).collect()
    }
}

/// Deterministic encoding of every field but `hash`: fixed field order,
/// no whitespace, UTF-8 strings, little-endian fixed-width integers.
fn canonical_encode(entry: &LogEntry) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + 8 + 8 + 1 + entry.message.len() + 9 + 32);
    out.extend_from_slice(&entry.id);
    out.extend_from_slice(&entry.seq.to_le_bytes());
    out.extend_from_slice(&entry.timestamp_unix_ms.to_le_bytes());
    out.push(entry.level.tag());
    out.extend_from_slice(&(entry.message.len() as u64).to_le_bytes());
    out.extend_from_slice(entry.message.as_bytes());
    match &entry.data {
        Some(data) => {
            out.push(1);
            out.extend_from_slice(&(data.len() as u64).to_le_bytes());
            out.extend_from_slice(data.as_bytes());
        }
        None => out.push(0),
    }
    out.extend_from_slice(&entry.prev_hash);
    out
}

fn write_entry(out: &mut Vec<u8>, entry: &LogEntry) {
    out.extend_from_slice(&canonical_encode(entry));
    out.extend_from_slice(&entry.hash);
}

fn parse_entries(bytes: &[u8]) -> Result<Vec<LogEntry>> {
    let mut cursor = bytes;
    let magic = take(&mut cursor, 8)?;
    if magic != MAGIC {
        return Err(Error::ImportFailed {
            reason: "unrecognized chain export format".to_string(),
        });
    }
    let count = u64::from_le_bytes(take(&mut cursor, 8)?.try_into().expect("8 bytes"));

    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let id: [u8; 16] = take(&mut cursor, 16)?.try_into().expect("16 bytes");
        let seq = u64::from_le_bytes(take(&mut cursor, 8)?.try_into().expect("8 bytes"));
        let timestamp_unix_ms = u64::from_le_bytes(take(&mut cursor, 8)?.try_into().expect("8 bytes"));
        let level_tag = take(&mut cursor, 1)?[0];
        let level = Level::from_tag(level_tag).ok_or_else(|| Error::ImportFailed {
            reason: "unrecognized log level tag".to_string(),
        })?;
        let message_len = u64::from_le_bytes(take(&mut cursor, 8)?.try_into().expect("8 bytes")) as usize;
        let message = String::from_utf8(take(&mut cursor, message_len)?.to_vec()).map_err(|_| Error::ImportFailed {
            reason: "message is not valid UTF-8".to_string(),
        })?;
        let has_data = take(&mut cursor, 1)?[0];
        let data = if has_data == 1 {
            let data_len = u64::from_le_bytes(take(&mut cursor, 8)?.try_into().expect("8 bytes")) as usize;
            Some(
                String::from_utf8(take(&mut cursor, data_len)?.to_vec()).map_err(|_| Error::ImportFailed {
                    reason: "data is not valid UTF-8".to_string(),
                })?,
            )
        } else {
            None
        };
        let prev_hash: [u8; 32] = take(&mut cursor, 32)?.try_into().expect("32 bytes");
        let hash: [u8; 32] = take(&mut cursor, 32)?.try_into().expect("32 bytes");

        entries.push(LogEntry {
            id,
            seq,
            timestamp_unix_ms,
            level,
            message,
            data,
            prev_hash,
            hash,
        });
    }

    if !cursor.is_empty() {
        return Err(Error::ImportFailed {
            reason: "trailing bytes after the declared entry count".to_string(),
        });
    }

    Ok(entries)
}

fn take<'a>(cursor: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if cursor.len() < n {
        return Err(Error::ImportFailed {
            reason: "truncated chain export".to_string(),
        });
    }
    let (head, tail) = cursor.split_at(n);
    *cursor = tail;
    Ok(head)
}

fn random_id() -> [u8; 16] {
    let bytes = entropy::random_bytes(16).expect("CSPRNG unavailable is a fatal condition elsewhere");
    bytes.as_slice().try_into().expect("16 bytes")
}

fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock predates the Unix epoch")
        .as_millis() as u64
}
