//! Log entry type and severity levels.

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Diagnostic detail, off by default in most deployments.
    Debug,
    /// Routine informational record.
    Info,
    /// Recoverable anomaly.
    Warning,
    /// Operation-ending failure.
    Error,
    /// Failure that threatens the integrity of the whole system.
    Critical,
}

impl Level {
    pub(super) fn tag(self) -> u8 {
        match self {
            Level::Debug => 0,
            Level::Info => 1,
            Level::Warning => 2,
            Level::Error => 3,
            Level::Critical => 4,
        }
    }

    pub(super) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Level::Debug),
            1 => Some(Level::Info),
            2 => Some(Level::Warning),
            3 => Some(Level::Error),
            4 => Some(Level::Critical),
            _ => None,
        }
    }
}

/// One entry in a [`super::Chain`]. Every field except `hash` feeds the
/// hash computation that chains it to its predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub(super) id: [u8; 16],
    pub(super) seq: u64,
    pub(super) timestamp_unix_ms: u64,
    pub(super) level: Level,
    pub(super) message: String,
    pub(super) data: Option<String>,
    pub(super) prev_hash: [u8; 32],
    pub(super) hash: [u8; 32],
}

impl LogEntry {
    /// Random 16-byte identity assigned at append time.
    pub fn id(&self) -> [u8; 16] {
        self.id
    }

    /// Position in the chain; `0` is the genesis entry.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Milliseconds since the Unix epoch when this entry was appended.
    pub fn timestamp_unix_ms(&self) -> u64 {
        self.timestamp_unix_ms
    }

    /// Severity of this entry.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Free-text message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Opaque caller-supplied payload, stored and hashed but never
    /// interpreted.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Hash of the previous entry (all zero for the genesis entry).
    pub fn prev_hash(&self) -> [u8; 32] {
        self.prev_hash
    }

    /// `HMAC-SHA256(chain_key, canonical_encode(self \ {hash}))`.
    pub fn hash(&self) -> [u8; 32] {
        self.hash
    }
}
