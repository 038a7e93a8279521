//! Sequential reads of big-endian integers, variable-length integers and
//! length-prefixed strings.

use std::io::Read;

use crate::{Result, StoreError};

const VINT_MAX_BYTES: usize = 5;
const VLONG_MAX_BYTES: usize = 10;
const SKIP_BUFFER_SIZE: usize = 1024;

/// Abstract source of bytes.
///
/// Only [`read_byte`](DataInput::read_byte) and
/// [`read_bytes`](DataInput::read_bytes) are required; everything else is
/// derived from them. Every `std::io::Read` is a `DataInput`, so a byte slice
/// can be decoded in place:
///
/// ```
/// use store_io::DataInput;
///
/// let bytes = [0x00u8, 0x2a, 0xff];
/// let mut input = &bytes[..];
/// assert_eq!(input.read_short().unwrap(), 42);
/// assert_eq!(input.read_byte().unwrap(), 0xff);
/// assert!(input.read_byte().unwrap_err().is_eof());
/// ```
pub trait DataInput {
    fn read_byte(&mut self) -> Result<u8>;

    /// Fills `buf` completely or fails.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()>;

    fn read_short(&mut self) -> Result<u16> {
        let mut b = [0u8; 2];
        self.read_bytes(&mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    fn read_int(&mut self) -> Result<u32> {
        let mut b = [0u8; 4];
        self.read_bytes(&mut b)?;
        Ok(u32::from_be_bytes(b))
    }

    fn read_long(&mut self) -> Result<u64> {
        let mut b = [0u8; 8];
        self.read_bytes(&mut b)?;
        Ok(u64::from_be_bytes(b))
    }

    fn read_vint(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for i in 0..VINT_MAX_BYTES {
            let b = self.read_byte()?;
            value |= u32::from(b & 0x7F) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(StoreError::MalformedVarInt {
            max_bytes: VINT_MAX_BYTES,
        })
    }

    fn read_vlong(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..VLONG_MAX_BYTES {
            let b = self.read_byte()?;
            value |= u64::from(b & 0x7F) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(StoreError::MalformedVarInt {
            max_bytes: VLONG_MAX_BYTES,
        })
    }

    /// Reads a vint length followed by that many UTF-8 bytes.
    fn read_string(&mut self) -> Result<String> {
        let len = self.read_vint()? as usize;
        let mut bytes = vec![0u8; len];
        self.read_bytes(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Consumes and discards `count` bytes.
    fn skip_bytes(&mut self, count: u64) -> Result<()> {
        let mut scratch = [0u8; SKIP_BUFFER_SIZE];
        let mut remaining = count;
        while remaining > 0 {
            let chunk = remaining.min(SKIP_BUFFER_SIZE as u64) as usize;
            self.read_bytes(&mut scratch[..chunk])?;
            remaining -= chunk as u64;
        }
        Ok(())
    }
}

impl<R: Read + ?Sized> DataInput for R {
    fn read_byte(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_exact(buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() -> Result<()> {
        let bytes = [
            0x12, 0x34, // short
            0xde, 0xad, 0xbe, 0xef, // int
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, // long
        ];
        let mut input = &bytes[..];
        assert_eq!(input.read_short()?, 0x1234);
        assert_eq!(input.read_int()?, 0xdead_beef);
        assert_eq!(input.read_long()?, 0x0102_0304_0506_0708);
        assert!(input.is_empty());
        Ok(())
    }

    #[test]
    fn reads_vint() -> Result<()> {
        let bytes = [0x00, 0x7f, 0x80, 0x01, 0xac, 0x02];
        let mut input = &bytes[..];
        assert_eq!(input.read_vint()?, 0);
        assert_eq!(input.read_vint()?, 127);
        assert_eq!(input.read_vint()?, 128);
        assert_eq!(input.read_vint()?, 300);
        Ok(())
    }

    #[test]
    fn rejects_overlong_vint() {
        let bytes = [0xffu8; 6];
        let mut input = &bytes[..];
        assert!(matches!(
            input.read_vint(),
            Err(StoreError::MalformedVarInt { max_bytes: 5 })
        ));
    }

    #[test]
    fn skip_consumes_exactly() -> Result<()> {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
        let mut input = bytes.as_slice();
        input.skip_bytes(2049)?;
        assert_eq!(input.read_byte()?, (2049 % 256) as u8);
        assert_eq!(input.len(), 3000 - 2050);
        Ok(())
    }

    #[test]
    fn truncated_input_is_eof() {
        let bytes = [0x01u8, 0x02, 0x03];
        let mut input = &bytes[..];
        let err = input.read_int().unwrap_err();
        assert!(err.is_eof());
    }
}
