//! UMC on-disk message catalog: signature, header, lookup table and message
//! blob. See the byte layout table in `SPEC_FULL.md` section 4.3.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::error::CodecError;
use crate::hash::hash_message_id;
use crate::io::ByteReader;

const SIGNATURE: [u8; 4] = *b"UMC\0";
const MAX_LANGUAGE_LEN: usize = 128;
const TABLE_ENTRY_SIZE: usize = 20;

/// One entry of the lookup table: `(hash, offset, length)` packed to 20
/// bytes on disk, never the natural 24-byte `repr(Rust)` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageEntry {
    pub hash: u64,
    pub offset: u64,
    pub length: u32,
}

/// A decoded message catalog: language name, LCID, lookup table and blob.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    language: String,
    lcid: u32,
    table: Vec<MessageEntry>,
    blob: Vec<u8>,
}

/// Reads just the embedded LCID of a `.umc` file without decoding the rest
/// of the catalog: seeks past the signature and the variable-length
/// language name, then reads the four-byte LCID field directly.
pub fn peek_lcid(path: impl AsRef<Path>) -> Result<u32> {
    let file = File::open(path.as_ref()).with_context(|| format!("opening {:?}", path.as_ref()))?;
    let mut reader = ByteReader::new(BufReader::new(file));
    reader.seek(4)?;
    let lang_len = reader.read_u8()? as u64;
    reader.seek(4 + 1 + lang_len)?;
    reader.read_u32()
}

impl MessageCatalog {
    /// Opens and fully decodes a `.umc` file.
    ///
    /// Any short read, signature mismatch, wrong extension, or internal
    /// layout inconsistency yields `Err` — the catalog is never
    /// partial-populated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext_ok = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("umc"))
            .unwrap_or(false);
        if !ext_ok {
            bail!("catalog path {:?} does not have a .umc extension", path);
        }

        let file = File::open(path).with_context(|| format!("opening catalog {:?}", path))?;
        let mut reader = ByteReader::new(BufReader::new(file));
        Self::decode(&mut reader)
    }

    fn decode<R: std::io::Read + std::io::Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        let sig = reader.read_exact(4)?;
        if sig.as_slice() != SIGNATURE {
            let mut found = [0u8; 4];
            found.copy_from_slice(&sig);
            bail!(CodecError::BadSignature {
                expected: SIGNATURE,
                found,
            });
        }

        let lang_len = reader.read_u8()? as usize;
        if lang_len > MAX_LANGUAGE_LEN {
            bail!(CodecError::BadLayout(format!(
                "language length {lang_len} exceeds the {MAX_LANGUAGE_LEN}-byte cap"
            )));
        }

        let lang_and_lcid = reader.read_exact(lang_len + 4)?;
        let language = String::from_utf8(lang_and_lcid[..lang_len].to_vec())
            .context("language name is not valid UTF-8")?;
        let lcid = u32::from_le_bytes([
            lang_and_lcid[lang_len],
            lang_and_lcid[lang_len + 1],
            lang_and_lcid[lang_len + 2],
            lang_and_lcid[lang_len + 3],
        ]);

        let count = reader.read_u32()? as usize;
        let (table, blob) = if count == 0 {
            (Vec::new(), Vec::new())
        } else {
            let raw_table = reader.read_exact(count * TABLE_ENTRY_SIZE)?;
            let mut table = Vec::with_capacity(count);
            let mut blob_size: u64 = 0;
            for i in 0..count {
                let off = i * TABLE_ENTRY_SIZE;
                let entry_bytes = &raw_table[off..off + TABLE_ENTRY_SIZE];
                let hash = u64::from_le_bytes(entry_bytes[0..8].try_into().unwrap());
                let offset = u64::from_le_bytes(entry_bytes[8..16].try_into().unwrap());
                let length = u32::from_le_bytes(entry_bytes[16..20].try_into().unwrap());
                blob_size = blob_size
                    .checked_add(length as u64)
                    .ok_or_else(|| CodecError::BadLayout("blob size overflow".to_string()))?;
                table.push(MessageEntry {
                    hash,
                    offset,
                    length,
                });
            }

            let blob = reader.read_exact(blob_size as usize)?;
            for entry in &table {
                let end = entry
                    .offset
                    .checked_add(entry.length as u64)
                    .ok_or_else(|| CodecError::BadLayout("entry offset+length overflow".into()))?;
                if end > blob.len() as u64 {
                    bail!(CodecError::BadLayout(format!(
                        "entry offset={} length={} exceeds blob size {}",
                        entry.offset,
                        entry.length,
                        blob.len()
                    )));
                }
            }
            (table, blob)
        };

        let catalog = Self {
            language,
            lcid,
            table,
            blob,
        };
        if !catalog.is_valid() {
            bail!(CodecError::BadLayout(
                "catalog has empty language or out-of-range LCID".to_string()
            ));
        }
        Ok(catalog)
    }

    /// `language` non-empty and `lcid` in `[1, 0x7FFF_FFFF]`. An empty table
    /// and blob are still legal (empty-but-valid catalog).
    pub fn is_valid(&self) -> bool {
        !self.language.is_empty() && self.lcid > 0 && self.lcid <= 0x7FFF_FFFF
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn lcid(&self) -> u32 {
        self.lcid
    }

    pub fn table(&self) -> &[MessageEntry] {
        &self.table
    }

    fn find_entry(&self, id: &str) -> Option<&MessageEntry> {
        let key = hash_message_id(id);
        self.table.iter().find(|e| e.hash == key)
    }

    pub fn has_message(&self, id: &str) -> bool {
        self.find_entry(id).is_some()
    }

    /// Fetches and UTF-8 decodes the raw message body for `id`, without
    /// applying `{%N}` substitution. Returns `None` on a lookup miss, a
    /// bounds failure, or a UTF-8 decode failure.
    pub fn raw_message(&self, id: &str) -> Option<&str> {
        let entry = self.find_entry(id)?;
        let start = entry.offset as usize;
        let end = start.checked_add(entry.length as usize)?;
        let bytes = self.blob.get(start..end)?;
        std::str::from_utf8(bytes).ok()
    }
}
