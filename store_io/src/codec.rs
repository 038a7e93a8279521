//! Codec headers: a magic number, the codec name and a format version.
//!
//! Every versioned block in an index file starts with one of these so that
//! a reader can reject foreign or future data before interpreting it.

use tracing::debug;

use crate::{DataInput, DataOutput, Result, StoreError};

/// First four bytes of every codec header.
pub const CODEC_MAGIC: u32 = 0x3fd7_6c17;

/// Writes `magic | name | version`.
///
/// # Panics
///
/// Panics if `codec` is not ASCII or is 128 bytes or longer; codec names are
/// compile-time constants.
pub fn write_header<W: DataOutput + ?Sized>(out: &mut W, codec: &str, version: i32) -> Result<()> {
    assert!(
        codec.is_ascii() && codec.len() < 128,
        "codec name must be simple ASCII shorter than 128 bytes, got {codec:?}"
    );
    out.write_int(CODEC_MAGIC)?;
    out.write_string(codec)?;
    out.write_int(version as u32)
}

/// Number of bytes [`write_header`] emits for `codec`.
pub fn header_length(codec: &str) -> usize {
    4 + 1 + codec.len() + 4
}

/// Reads a header written by [`write_header`] and returns its version.
///
/// Fails when the magic or the codec name differ, or when the version lies
/// outside `min_version..=max_version`.
pub fn check_header<R: DataInput + ?Sized>(
    input: &mut R,
    codec: &str,
    min_version: i32,
    max_version: i32,
) -> Result<i32> {
    let magic = input.read_int()?;
    if magic != CODEC_MAGIC {
        return Err(StoreError::InvalidMagic {
            expected: CODEC_MAGIC,
            found: magic,
        });
    }
    let actual = input.read_string()?;
    if actual != codec {
        return Err(StoreError::CodecMismatch {
            expected: codec.to_string(),
            found: actual,
        });
    }
    let version = input.read_int()? as i32;
    if version < min_version {
        return Err(StoreError::FormatTooOld {
            version,
            min: min_version,
        });
    }
    if version > max_version {
        return Err(StoreError::FormatTooNew {
            version,
            max: max_version,
        });
    }
    debug!(codec, version, "codec header accepted");
    Ok(version)
}
