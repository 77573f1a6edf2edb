//! UTS on-disk settings artifact: two LCIDs plus the installed-catalog
//! list. See the byte layout table in `SPEC_FULL.md` section 4.4.

use std::io::{Read, Seek, Write};

use anyhow::{bail, Result};

use crate::error::CodecError;
use crate::io::{ByteReader, ByteWriter};

const SIGNATURE: [u8; 4] = *b"UTS\0";
const MAX_NAME_LEN: usize = 63;
const NAME_SLOT_LEN: usize = 64;
const CATALOG_SLOT_LEN: usize = NAME_SLOT_LEN + 4;
const MAX_CATALOG_COUNT: usize = u16::MAX as usize;

/// An installed-catalog descriptor: a file name plus the LCID it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledCatalog {
    pub name: String,
    pub lcid: u32,
}

/// The decoded contents of a `settings.uts` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtsData {
    pub default_lcid: u32,
    pub preferred_lcid: u32,
    pub catalogs: Vec<InstalledCatalog>,
}

/// Encodes `(default_lcid, preferred_lcid, catalogs)` as a fresh UTS file.
///
/// If `catalogs` has more than 65535 entries, the trailing entries are
/// discarded and a warning names how many were dropped. Any catalog name
/// exceeding 63 UTF-8 bytes aborts the whole encode with
/// [`CodecError::OversizedName`].
pub fn encode_uts<W: Write>(
    writer: W,
    default_lcid: u32,
    preferred_lcid: u32,
    catalogs: &[InstalledCatalog],
) -> Result<()> {
    for catalog in catalogs {
        if catalog.name.len() > MAX_NAME_LEN {
            bail!(CodecError::OversizedName {
                name: catalog.name.clone(),
                len: catalog.name.len(),
            });
        }
    }

    let trimmed = if catalogs.len() > MAX_CATALOG_COUNT {
        log::warn!(
            "Requested too many catalogs ({}), trimmed to {MAX_CATALOG_COUNT} (dropped {} trailing entries)",
            catalogs.len(),
            catalogs.len() - MAX_CATALOG_COUNT,
        );
        &catalogs[..MAX_CATALOG_COUNT]
    } else {
        catalogs
    };

    let mut w = ByteWriter::new(writer);
    w.write_all(&SIGNATURE)?;
    w.write_u32(default_lcid)?;
    w.write_u32(preferred_lcid)?;
    w.write_u16(trimmed.len() as u16)?;
    for catalog in trimmed {
        let mut slot = [0u8; NAME_SLOT_LEN];
        let name_bytes = catalog.name.as_bytes();
        slot[..name_bytes.len()].copy_from_slice(name_bytes);
        w.write_all(&slot)?;
        w.write_u32(catalog.lcid)?;
    }

    Ok(())
}

/// Decodes a UTS file. Never fails: a missing signature, a truncated
/// header, or a truncated slot list yields an empty installed-catalog list
/// with both LCIDs reset to zero (logged at `warn`), matching the
/// "no settings loaded" recovery the settings store relies on.
pub fn decode_uts<R: Read + Seek>(reader: R) -> UtsData {
    match try_decode_uts(reader) {
        Ok(data) => data,
        Err(err) => {
            log::warn!("failed to decode UTS artifact, using empty settings: {err:#}");
            UtsData::default()
        }
    }
}

fn try_decode_uts<R: Read + Seek>(reader: R) -> Result<UtsData> {
    let mut r = ByteReader::new(reader);
    let header = r.read_exact(14)?;
    if header[0..4] != SIGNATURE {
        let mut found = [0u8; 4];
        found.copy_from_slice(&header[0..4]);
        bail!(CodecError::BadSignature {
            expected: SIGNATURE,
            found,
        });
    }
    let default_lcid = u32::from_le_bytes(header[4..8].try_into().unwrap());
    let preferred_lcid = u32::from_le_bytes(header[8..12].try_into().unwrap());
    let count = u16::from_le_bytes(header[12..14].try_into().unwrap()) as usize;

    let mut catalogs = Vec::with_capacity(count);
    for _ in 0..count {
        let slot = r.read_exact(CATALOG_SLOT_LEN)?;
        let name_bytes = &slot[..NAME_SLOT_LEN];
        let nul = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_SLOT_LEN);
        let name = String::from_utf8_lossy(&name_bytes[..nul]).into_owned();
        let lcid = u32::from_le_bytes(slot[NAME_SLOT_LEN..CATALOG_SLOT_LEN].try_into().unwrap());
        catalogs.push(InstalledCatalog { name, lcid });
    }

    Ok(UtsData {
        default_lcid,
        preferred_lcid,
        catalogs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::build_uts_bytes;
    use std::io::Cursor;

    #[test]
    fn round_trips_catalog_list_and_lcids() {
        let catalogs = vec![
            InstalledCatalog {
                name: "en-US.umc".to_string(),
                lcid: 0x409,
            },
            InstalledCatalog {
                name: "pl-PL.umc".to_string(),
                lcid: 0x415,
            },
        ];
        let mut buf = Vec::new();
        encode_uts(&mut buf, 0x409, 0x415, &catalogs).unwrap();
        assert_eq!(buf.len(), 14 + 2 * 68);

        let data = decode_uts(Cursor::new(buf));
        assert_eq!(data.default_lcid, 0x409);
        assert_eq!(data.preferred_lcid, 0x415);
        assert_eq!(data.catalogs, catalogs);
    }

    #[test]
    fn trims_to_65535_keeping_the_first_entries() {
        let catalogs: Vec<InstalledCatalog> = (0..70_000)
            .map(|i| InstalledCatalog {
                name: format!("c{i}"),
                lcid: 1,
            })
            .collect();
        let mut buf = Vec::new();
        encode_uts(&mut buf, 1, 1, &catalogs).unwrap();
        let data = decode_uts(Cursor::new(buf));
        assert_eq!(data.catalogs.len(), 65535);
        assert_eq!(data.catalogs[0], catalogs[0]);
        assert_eq!(data.catalogs[65534], catalogs[65534]);
    }

    #[test]
    fn oversized_name_aborts_encode() {
        let catalogs = vec![InstalledCatalog {
            name: "x".repeat(64),
            lcid: 1,
        }];
        let mut buf = Vec::new();
        let err = encode_uts(&mut buf, 0, 0, &catalogs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::OversizedName { .. })
        ));
    }

    #[test]
    fn malformed_file_decodes_to_empty_reset_state() {
        let data = decode_uts(Cursor::new(vec![1, 2, 3]));
        assert_eq!(data, UtsData::default());
    }

    #[test]
    fn name_without_trailing_nul_uses_the_full_slot() {
        let name = "a".repeat(64);
        let bytes = build_uts_bytes(1, 1, &[(&name, 7)]);
        let data = decode_uts(Cursor::new(bytes));
        assert_eq!(data.catalogs[0].name, name);
    }
}
