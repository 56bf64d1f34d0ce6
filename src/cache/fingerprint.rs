//! Deterministic argument fingerprinting.
//!
//! Canonicalizes a call's arguments into a byte string and hashes it
//! with a fixed salt, so identical calls across processes sharing the
//! same build land on the same fingerprint.

use std::collections::BTreeMap;

use crate::hash::sha256;

/// Truncation threshold for request-like string bodies before hashing.
const BODY_TRUNCATION_BYTES: usize = 8192;

/// Header names redacted from request-like arguments before hashing.
const REDACTED_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "x-api-key", "token"];

const REDACTED_MARKER: &str = "<redacted>";
const CYCLE_MARKER: &str = "<cycle>";

/// A canonicalizable call argument. Request-like calls are built from
/// `Arg::Map` with the conventional keys `method`, `url`, `headers`,
/// `params`, `body`.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Absence of a value.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit IEEE-754 float.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    List(Vec<Arg>),
    /// Key-sorted mapping.
    Map(BTreeMap<String, Arg>),
    /// A function reference, replaced with a `<fn:name>` marker.
    Fn(String),
    /// A self-reference detected while building the argument tree,
    /// replaced with a `<cycle>` marker.
    Cycle,
}

/// Compute the deterministic fingerprint of a call: `SHA-256(canonical
/// bytes of args ‖ fixed_salt)`.
pub fn fingerprint(args: &[Arg], fixed_salt: &[u8]) -> [u8; 32] {
    let mut buf = Vec::new();
    encode_seq(args, &mut buf);
    buf.extend_from_slice(fixed_salt);
    sha256(&buf)
}

fn encode(arg: &Arg, out: &mut Vec<u8>) {
    match arg {
        Arg::Null => out.push(0),
        Arg::Bool(b) => {
            out.push(1);
            out.push(u8::from(*b));
        }
        Arg::Int(n) => {
            out.push(2);
            out.extend_from_slice(&n.to_le_bytes());
        }
        Arg::Float(f) => {
            out.push(3);
            out.extend_from_slice(&f.to_bits().to_le_bytes());
        }
        Arg::Str(s) => {
            out.push(4);
            encode_str(maybe_truncate(s), out);
        }
        Arg::Bytes(b) => {
            out.push(5);
            out.extend_from_slice(&(b.len() as u64).to_le_bytes());
            out.extend_from_slice(b);
        }
        Arg::List(items) => {
            out.push(6);
            encode_seq(items, out);
        }
        Arg::Map(map) => {
            out.push(7);
            out.extend_from_slice(&(map.len() as u64).to_le_bytes());
            // `BTreeMap` already iterates in key-sorted UTF-8 byte order.
            for (key, value) in map {
                encode_str(key, out);
                if is_redacted_header(key) {
                    encode_str(REDACTED_MARKER, out);
                } else {
                    encode(value, out);
                }
            }
        }
        Arg::Fn(name) => {
            out.push(8);
            encode_str(&format!("<fn:{name}>"), out);
        }
        Arg::Cycle => {
            out.push(9);
            encode_str(CYCLE_MARKER, out);
        }
    }
}

fn encode_seq(items: &[Arg], out: &mut Vec<u8>) {
    out.extend_from_slice(&(items.len() as u64).to_le_bytes());
    for item in items {
        encode(item, out);
    }
}

fn encode_str(s: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(&(s.len() as u64).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn maybe_truncate(s: &str) -> &str {
    if s.len() <= BODY_TRUNCATION_BYTES {
        return s;
    }
    let mut end = BODY_TRUNCATION_BYTES;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn is_redacted_header(key: &str) -> bool {
    REDACTED_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(key))
}
