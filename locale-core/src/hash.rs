//! 64-bit digest of a message identifier, shared between the UMC encoder and
//! the runtime loader so both sides agree on the same key without either one
//! parsing the identifier's structure.

use xxhash_rust::xxh3::xxh3_64;

/// Hashes the raw UTF-8 bytes of a message identifier.
///
/// Deterministic per byte sequence; callers must not depend on the concrete
/// numeric value, only on `hash_message_id(a) == hash_message_id(b)` iff
/// `a == b`.
pub fn hash_message_id(id: &str) -> u64 {
    xxh3_64(id.as_bytes())
}
