//! # store_io
//!
//! Binary stream primitives shared by the index codecs.
//!
//! Every fixed-width integer is big-endian. Variable-length integers use
//! seven payload bits per byte, low group first, with the high bit set on
//! every byte but the last.
//!
//! ```rust
//! use store_io::{DataInput, DataOutput};
//!
//! let mut buf = Vec::new();
//! buf.write_vint(300).unwrap();
//! buf.write_long(0x0102_0304_0506_0708).unwrap();
//!
//! let mut input = buf.as_slice();
//! assert_eq!(input.read_vint().unwrap(), 300);
//! assert_eq!(input.read_long().unwrap(), 0x0102_0304_0506_0708);
//! ```

pub mod codec;
pub mod data_input;
pub mod data_output;
pub mod error;

pub use codec::{CODEC_MAGIC, check_header, header_length, write_header};
pub use data_input::DataInput;
pub use data_output::DataOutput;
pub use error::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;
