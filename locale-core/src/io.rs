//! Typed little-endian byte I/O over exact-length reads/writes.
//!
//! Never reinterprets a buffer as a packed struct: every multi-byte field is
//! decoded field-by-field with `from_le_bytes`, matching the on-disk layouts
//! in [`crate::umc`] and [`crate::uts`] regardless of the host's struct
//! packing rules.

use std::io::{Read, Seek, SeekFrom, Write};

use anyhow::{Context, Result};

use crate::error::CodecError;

/// Wraps any `Read + Seek` and exposes typed little-endian loads plus
/// exact-length reads that fail distinctly from a plain EOF.
pub struct ByteReader<R> {
    inner: R,
}

impl<R: Read + Seek> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn seek(&mut self, absolute_offset: u64) -> Result<()> {
        self.inner
            .seek(SeekFrom::Start(absolute_offset))
            .with_context(|| format!("seeking to offset {absolute_offset}"))?;
        Ok(())
    }

    pub fn stream_len(&mut self) -> Result<u64> {
        let pos = self.inner.stream_position()?;
        let len = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(len)
    }

    /// Reads exactly `len` bytes, or fails with [`CodecError::Truncated`].
    pub fn read_exact(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        if let Err(err) = self.inner.read_exact(&mut buf) {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                return Err(CodecError::Truncated {
                    wanted: len as u64,
                    available: 0,
                }
                .into());
            }
            return Err(err).context("reading exact-length buffer");
        }
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_exact(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_exact(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let b = self.read_exact(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}

/// Wraps any `Write` and exposes typed little-endian stores.
pub struct ByteWriter<W> {
    inner: W,
}

impl<W: Write> ByteWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .context("writing exact-length buffer")
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_little_endian_integers() {
        let data = vec![0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0xAA];
        let mut r = ByteReader::new(Cursor::new(data));
        assert_eq!(r.read_u16().unwrap(), 1);
        assert_eq!(r.read_u32().unwrap(), 2);
        assert_eq!(r.read_u8().unwrap(), 0xAA);
    }

    #[test]
    fn short_read_is_truncated_error() {
        let mut r = ByteReader::new(Cursor::new(vec![0x01]));
        let err = r.read_u32().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::Truncated { wanted: 4, .. })
        ));
    }

    #[test]
    fn seek_then_read_roundtrip() {
        let data = vec![0, 0, 0, 0, 0x42];
        let mut r = ByteReader::new(Cursor::new(data));
        r.seek(4).unwrap();
        assert_eq!(r.read_u8().unwrap(), 0x42);
    }

    #[test]
    fn writer_writes_le_integers() {
        let mut buf = Vec::new();
        {
            let mut w = ByteWriter::new(&mut buf);
            w.write_u32(0x0409).unwrap();
            w.write_u16(3).unwrap();
        }
        assert_eq!(buf, vec![0x09, 0x04, 0x00, 0x00, 0x03, 0x00]);
    }
}
