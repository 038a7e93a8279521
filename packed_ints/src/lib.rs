//! # packed_ints
//!
//! Compact storage for arrays of unsigned integers that all fit in a known
//! number of bits, with a versioned on-disk format.
//!
//! ```rust
//! use packed_ints::{COMPACT, Mutable, Reader, get_mutable, get_reader};
//!
//! // 1000 values of at most 10 bits: 1250 bytes instead of 8000
//! let mut values = get_mutable(1000, 10, COMPACT);
//! for i in 0..1000 {
//!     values.set(i, i as u64 % 1024);
//! }
//!
//! let mut buf = Vec::new();
//! values.save(&mut buf).unwrap();
//!
//! let reader = get_reader(&mut buf.as_slice()).unwrap();
//! assert_eq!(reader.get(999), 999 % 1024);
//! ```
//!
//! ## Growing on demand
//!
//! ```rust
//! use packed_ints::{DEFAULT, GrowableWriter, Mutable, Reader};
//!
//! let mut ids = GrowableWriter::new(1, 3, DEFAULT);
//! ids.set(0, 1);
//! ids.set(1, 70_000);
//! assert!(ids.bits_per_value() >= 17);
//! assert_eq!(ids.get(0), 1);
//! ```

pub mod array;
pub mod bulk;
pub mod config;
pub mod direct;
pub mod error;
pub mod factory;
pub mod format;
pub mod growable;
pub mod iter;
pub mod packed64;
pub mod reader;
pub mod single_block;
pub mod three_blocks;
pub mod writer;

mod bit_ops;

pub use array::PackedArray;
pub use bit_ops::{bits_required, max_value};
pub use bulk::{
    BlockGeometry, BulkOperation, BulkOperationPacked, BulkOperationPackedSingleBlock,
    PackedIntsDecoder, PackedIntsEncoder, get_decoder, get_encoder,
};
pub use config::{COMPACT, DEFAULT, DEFAULT_BUFFER_SIZE, FAST, FASTEST, PackedConfig};
pub use direct::{Direct8, Direct16, Direct32, Direct64};
pub use error::PackedIntsError;
pub use factory::{
    PackedHeader, get_mutable, get_mutable_with_format, get_reader, get_reader_no_header,
    read_header,
};
pub use format::{
    CODEC_NAME, Format, FormatAndBits, MAX_VALUE_COUNT, VERSION_BYTE_ALIGNED, VERSION_CURRENT,
    VERSION_START, check_value_count, check_version,
};
pub use growable::GrowableWriter;
pub use iter::{PackedReaderIterator, get_reader_iterator, get_reader_iterator_with_config};
pub use packed64::Packed64;
pub use reader::{Mutable, Reader, copy};
pub use single_block::{Packed64SingleBlock, SUPPORTED_BITS_PER_VALUE};
pub use three_blocks::{Packed8ThreeBlocks, Packed16ThreeBlocks, THREE_BLOCKS_MAX_SIZE};
pub use writer::{PackedWriter, get_writer, get_writer_with_config};

pub use store_io::{DataInput, DataOutput};

pub type Result<T> = std::result::Result<T, PackedIntsError>;
