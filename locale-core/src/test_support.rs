//! Test-only fixture builders shared across the codec unit tests.

#![cfg(test)]

use crate::hash::hash_message_id;

/// Hand-assembles a well-formed `.umc` byte buffer for test fixtures.
pub fn build_umc_bytes(language: &str, lcid: u32, messages: &[(&str, &str)]) -> Vec<u8> {
    let mut bytes = b"UMC\0".to_vec();
    bytes.push(language.len() as u8);
    bytes.extend_from_slice(language.as_bytes());
    bytes.extend_from_slice(&lcid.to_le_bytes());
    bytes.extend_from_slice(&(messages.len() as u32).to_le_bytes());

    let mut blob = Vec::new();
    let mut entries = Vec::new();
    for (id, msg) in messages {
        let offset = blob.len() as u64;
        blob.extend_from_slice(msg.as_bytes());
        entries.push((hash_message_id(id), offset, msg.len() as u32));
    }

    for (hash, offset, length) in &entries {
        bytes.extend_from_slice(&hash.to_le_bytes());
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&length.to_le_bytes());
    }
    bytes.extend_from_slice(&blob);
    bytes
}

/// Hand-assembles a well-formed `.uts` byte buffer for test fixtures.
pub fn build_uts_bytes(default_lcid: u32, preferred_lcid: u32, catalogs: &[(&str, u32)]) -> Vec<u8> {
    let mut bytes = b"UTS\0".to_vec();
    bytes.extend_from_slice(&default_lcid.to_le_bytes());
    bytes.extend_from_slice(&preferred_lcid.to_le_bytes());
    bytes.extend_from_slice(&(catalogs.len() as u16).to_le_bytes());
    for (name, lcid) in catalogs {
        let mut slot = [0u8; 64];
        let name_bytes = name.as_bytes();
        slot[..name_bytes.len()].copy_from_slice(name_bytes);
        bytes.extend_from_slice(&slot);
        bytes.extend_from_slice(&lcid.to_le_bytes());
    }
    bytes
}
