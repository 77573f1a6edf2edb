//! Typed errors for the binary codecs and the format scanner.
//!
//! I/O failures from the underlying reader/writer are wrapped with
//! [`anyhow::Context`] at the call site instead of being folded into this
//! enum; `CodecError` only names the domain-level failures a caller might
//! want to match on.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("bad signature: expected {expected:?}, found {found:?}")]
    BadSignature { expected: [u8; 4], found: [u8; 4] },

    #[error("truncated read: wanted {wanted} bytes, {available} available")]
    Truncated { wanted: u64, available: u64 },

    #[error("bad layout: {0}")]
    BadLayout(String),

    #[error("format specifier references argument {idx}, only {count} supplied")]
    BadIndex { idx: usize, count: usize },

    #[error("catalog name {name:?} is {len} bytes, exceeds the 63-byte limit")]
    OversizedName { name: String, len: usize },

    #[error("positional argument {idx} out of range, count={count}")]
    ResourceOverrun { idx: usize, count: usize },
}
