use store_io::StoreError;
use thiserror::Error;

use crate::format::Format;

#[derive(Debug, Error)]
pub enum PackedIntsError {
    #[error("Version is too old, should be at least {min} (got {version})")]
    VersionTooOld { version: i32, min: i32 },

    #[error("Version is too new, should be at most {max} (got {version})")]
    VersionTooNew { version: i32, max: i32 },

    #[error("Unknown packed format id {0}")]
    UnknownFormat(u32),

    #[error("Bits per value must be in the range 1..=64, got {0}")]
    InvalidBitsPerValue(u32),

    #[error("Format {format:?} does not support {bits_per_value} bits per value")]
    UnsupportedBitsPerValue {
        format: Format,
        bits_per_value: u32,
    },

    #[error("Value count {value_count} exceeds the maximum of {max} for this layout")]
    CapacityExceeded { value_count: usize, max: usize },

    #[error("Writing past end of stream ({value_count} values declared)")]
    WritePastEnd { value_count: usize },

    #[error("Writer failed on an earlier flush and accepts no more values")]
    WriterFailed,

    #[error("Reading past end of stream ({value_count} values available)")]
    ReadPastEnd { value_count: usize },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<std::io::Error> for PackedIntsError {
    fn from(err: std::io::Error) -> Self {
        PackedIntsError::Store(StoreError::Io(err))
    }
}
