use thiserror::Error;

/// Errors raised while reading or writing a binary stream.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failure reported by the underlying reader or writer.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec header mismatch: expected magic {expected:#x}, found {found:#x}")]
    InvalidMagic { expected: u32, found: u32 },

    #[error("codec mismatch: expected {expected:?}, found {found:?}")]
    CodecMismatch { expected: String, found: String },

    #[error("format version {version} is too old, should be at least {min}")]
    FormatTooOld { version: i32, min: i32 },

    #[error("format version {version} is too new, should be at most {max}")]
    FormatTooNew { version: i32, max: i32 },

    #[error("malformed variable-length integer: more than {max_bytes} bytes")]
    MalformedVarInt { max_bytes: usize },

    #[error("invalid UTF-8 in string")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("string of {0} bytes cannot be length-prefixed")]
    StringTooLong(usize),
}

impl StoreError {
    /// True when the stream ended before the requested bytes were read.
    pub fn is_eof(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}
