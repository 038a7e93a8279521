//! Sequential writes mirroring [`DataInput`](crate::DataInput).

use std::io::Write;

use crate::{Result, StoreError};

/// Abstract sink of bytes. Every `std::io::Write` is a `DataOutput`.
pub trait DataOutput {
    fn write_byte(&mut self, b: u8) -> Result<()>;

    fn write_bytes(&mut self, buf: &[u8]) -> Result<()>;

    fn write_short(&mut self, v: u16) -> Result<()> {
        self.write_bytes(&v.to_be_bytes())
    }

    fn write_int(&mut self, v: u32) -> Result<()> {
        self.write_bytes(&v.to_be_bytes())
    }

    fn write_long(&mut self, v: u64) -> Result<()> {
        self.write_bytes(&v.to_be_bytes())
    }

    fn write_vint(&mut self, mut v: u32) -> Result<()> {
        while v & !0x7F != 0 {
            self.write_byte((v & 0x7F) as u8 | 0x80)?;
            v >>= 7;
        }
        self.write_byte(v as u8)
    }

    fn write_vlong(&mut self, mut v: u64) -> Result<()> {
        while v & !0x7F != 0 {
            self.write_byte((v & 0x7F) as u8 | 0x80)?;
            v >>= 7;
        }
        self.write_byte(v as u8)
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        let len = u32::try_from(s.len()).map_err(|_| StoreError::StringTooLong(s.len()))?;
        self.write_vint(len)?;
        self.write_bytes(s.as_bytes())
    }
}

impl<W: Write + ?Sized> DataOutput for W {
    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.write_all(&[b])?;
        Ok(())
    }

    fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.write_all(buf)?;
        Ok(())
    }
}
