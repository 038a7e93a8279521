//! Physical layouts, stream versions and their size arithmetic.

use crate::Result;
use crate::config::{COMPACT, FASTEST};
use crate::error::PackedIntsError;
use crate::single_block;
use crate::three_blocks::THREE_BLOCKS_MAX_SIZE;

/// Codec name written in every packed-ints header.
pub const CODEC_NAME: &str = "PackedInts";

/// Oldest stream version this crate can read.
pub const VERSION_START: i32 = 0;

/// From this version on, PACKED payloads are padded to whole bytes instead
/// of whole 64-bit words.
pub const VERSION_BYTE_ALIGNED: i32 = 1;

/// Version written by this crate.
pub const VERSION_CURRENT: i32 = VERSION_BYTE_ALIGNED;

/// Largest value count a serialized block may declare.
pub const MAX_VALUE_COUNT: usize = i32::MAX as usize;

/// Fails when `value_count` is larger than [`MAX_VALUE_COUNT`].
pub fn check_value_count(value_count: usize) -> Result<()> {
    if value_count > MAX_VALUE_COUNT {
        Err(PackedIntsError::CapacityExceeded {
            value_count,
            max: MAX_VALUE_COUNT,
        })
    } else {
        Ok(())
    }
}

/// Fails unless `VERSION_START <= version <= VERSION_CURRENT`.
pub fn check_version(version: i32) -> Result<()> {
    if version < VERSION_START {
        Err(PackedIntsError::VersionTooOld {
            version,
            min: VERSION_START,
        })
    } else if version > VERSION_CURRENT {
        Err(PackedIntsError::VersionTooNew {
            version,
            max: VERSION_CURRENT,
        })
    } else {
        Ok(())
    }
}

/// How values are laid out in the backing 64-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Values are written back to back and may straddle two words.
    Packed,
    /// Each word holds `64 / bits` whole values; leftover bits are padding.
    PackedSingleBlock,
}

impl Format {
    pub const PACKED_ID: u32 = 0;
    pub const PACKED_SINGLE_BLOCK_ID: u32 = 1;

    pub fn id(self) -> u32 {
        match self {
            Format::Packed => Self::PACKED_ID,
            Format::PackedSingleBlock => Self::PACKED_SINGLE_BLOCK_ID,
        }
    }

    pub fn from_id(id: u32) -> Result<Format> {
        match id {
            Self::PACKED_ID => Ok(Format::Packed),
            Self::PACKED_SINGLE_BLOCK_ID => Ok(Format::PackedSingleBlock),
            _ => Err(PackedIntsError::UnknownFormat(id)),
        }
    }

    /// Number of payload bytes needed to store `value_count` values of
    /// `bits_per_value` bits in a stream of the given version.
    pub fn byte_count(self, version: i32, value_count: usize, bits_per_value: u32) -> u64 {
        debug_assert!((1..=64).contains(&bits_per_value));
        match self {
            Format::Packed => {
                let total_bits = value_count as u64 * u64::from(bits_per_value);
                if version < VERSION_BYTE_ALIGNED {
                    8 * total_bits.div_ceil(64)
                } else {
                    total_bits.div_ceil(8)
                }
            }
            Format::PackedSingleBlock => {
                8 * self.long_count(version, value_count, bits_per_value) as u64
            }
        }
    }

    /// Number of 64-bit words needed to hold the payload in memory.
    pub fn long_count(self, version: i32, value_count: usize, bits_per_value: u32) -> usize {
        debug_assert!((1..=64).contains(&bits_per_value));
        match self {
            Format::PackedSingleBlock => {
                let values_per_block = (64 / bits_per_value) as usize;
                value_count.div_ceil(values_per_block)
            }
            Format::Packed => {
                let bytes = self.byte_count(version, value_count, bits_per_value);
                debug_assert!(bytes <= 8 * MAX_VALUE_COUNT as u64);
                bytes.div_ceil(8) as usize
            }
        }
    }

    pub fn is_supported(self, bits_per_value: u32) -> bool {
        match self {
            Format::Packed => (1..=64).contains(&bits_per_value),
            Format::PackedSingleBlock => single_block::is_supported(bits_per_value),
        }
    }

    /// Wasted bits per value.
    pub fn overhead_per_value(self, bits_per_value: u32) -> f32 {
        debug_assert!(self.is_supported(bits_per_value));
        match self {
            Format::Packed => 0.0,
            Format::PackedSingleBlock => {
                let values_per_block = 64 / bits_per_value;
                let overhead = 64 % bits_per_value;
                overhead as f32 / values_per_block as f32
            }
        }
    }

    /// Wasted bits per value relative to `bits_per_value`.
    pub fn overhead_ratio(self, bits_per_value: u32) -> f32 {
        self.overhead_per_value(bits_per_value) / bits_per_value as f32
    }
}

/// A layout choice: format plus the (possibly widened) bits per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatAndBits {
    pub format: Format,
    pub bits_per_value: u32,
}

impl FormatAndBits {
    /// Finds the fastest layout whose memory overhead stays below
    /// `acceptable_overhead_ratio`. `value_count` is `None` when unknown.
    pub fn fastest(
        value_count: Option<usize>,
        bits_per_value: u32,
        acceptable_overhead_ratio: f32,
    ) -> FormatAndBits {
        debug_assert!((1..=64).contains(&bits_per_value));
        let value_count = value_count.unwrap_or(i32::MAX as usize);

        let ratio = acceptable_overhead_ratio.clamp(COMPACT, FASTEST);
        let acceptable_overhead_per_value = ratio * bits_per_value as f32;
        let max_bits_per_value = bits_per_value + acceptable_overhead_per_value as u32;

        let mut format = Format::Packed;
        let actual = if bits_per_value <= 8 && max_bits_per_value >= 8 {
            8
        } else if bits_per_value <= 16 && max_bits_per_value >= 16 {
            16
        } else if bits_per_value <= 32 && max_bits_per_value >= 32 {
            32
        } else if bits_per_value <= 64 && max_bits_per_value >= 64 {
            64
        } else if value_count <= THREE_BLOCKS_MAX_SIZE
            && bits_per_value <= 24
            && max_bits_per_value >= 24
        {
            24
        } else if value_count <= THREE_BLOCKS_MAX_SIZE
            && bits_per_value <= 48
            && max_bits_per_value >= 48
        {
            48
        } else {
            let single_block = (bits_per_value..=max_bits_per_value.min(64)).find(|&bpv| {
                Format::PackedSingleBlock.is_supported(bpv) && {
                    let overhead = Format::PackedSingleBlock.overhead_per_value(bpv);
                    let acceptable = acceptable_overhead_per_value + bits_per_value as f32
                        - bpv as f32;
                    overhead <= acceptable
                }
            });
            match single_block {
                Some(bpv) => {
                    format = Format::PackedSingleBlock;
                    bpv
                }
                None => bits_per_value,
            }
        };

        FormatAndBits {
            format,
            bits_per_value: actual,
        }
    }
}
