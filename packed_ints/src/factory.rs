//! Entry points that pick a concrete layout, either from a serialized header
//! or from a requested width and overhead budget.

use store_io::{DataInput, check_header};
use tracing::debug;

use crate::Result;
use crate::array::PackedArray;
use crate::direct::{Direct8, Direct16, Direct32, Direct64};
use crate::error::PackedIntsError;
use crate::format::{CODEC_NAME, Format, FormatAndBits, check_value_count, check_version};
use crate::packed64::Packed64;
use crate::reader::{Mutable, Reader};
use crate::single_block::Packed64SingleBlock;
use crate::three_blocks::{Packed8ThreeBlocks, Packed16ThreeBlocks, THREE_BLOCKS_MAX_SIZE};

/// Metadata preceding every serialized packed-ints payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedHeader {
    pub version: i32,
    pub bits_per_value: u32,
    pub value_count: usize,
    pub format: Format,
}

fn check_bits_per_value(bits_per_value: u32) -> Result<()> {
    if (1..=64).contains(&bits_per_value) {
        Ok(())
    } else {
        Err(PackedIntsError::InvalidBitsPerValue(bits_per_value))
    }
}

/// Reads the codec header, then bits per value, value count and format id,
/// in that order.
pub fn read_header(input: &mut dyn DataInput) -> Result<PackedHeader> {
    let version = check_header(input, CODEC_NAME, i32::MIN, i32::MAX)?;
    check_version(version)?;
    let bits_per_value = input.read_vint()?;
    check_bits_per_value(bits_per_value)?;
    let value_count = input.read_vint()? as usize;
    check_value_count(value_count)?;
    let format = Format::from_id(input.read_vint()?)?;
    Ok(PackedHeader {
        version,
        bits_per_value,
        value_count,
        format,
    })
}

/// Restores a reader written by [`Mutable::save`](crate::Mutable::save) or a
/// [`PackedWriter`](crate::PackedWriter). The input is left right after the
/// payload.
pub fn get_reader(input: &mut dyn DataInput) -> Result<PackedArray> {
    let header = read_header(input)?;
    get_reader_no_header(
        input,
        header.format,
        header.version,
        header.value_count,
        header.bits_per_value,
    )
}

/// Reads a payload whose header was consumed elsewhere.
///
/// PACKED payloads of 8, 16, 32 and 64 bits load as direct arrays, 24 and
/// 48 bits as three-block arrays when the count allows; everything else
/// loads as [`Packed64`].
pub fn get_reader_no_header(
    input: &mut dyn DataInput,
    format: Format,
    version: i32,
    value_count: usize,
    bits_per_value: u32,
) -> Result<PackedArray> {
    check_version(version)?;
    check_bits_per_value(bits_per_value)?;
    check_value_count(value_count)?;
    let reader = match format {
        Format::PackedSingleBlock => PackedArray::Packed64SingleBlock(
            Packed64SingleBlock::from_input(version, input, value_count, bits_per_value)?,
        ),
        Format::Packed => match bits_per_value {
            8 => PackedArray::Direct8(Direct8::from_input(version, input, value_count)?),
            16 => PackedArray::Direct16(Direct16::from_input(version, input, value_count)?),
            32 => PackedArray::Direct32(Direct32::from_input(version, input, value_count)?),
            64 => PackedArray::Direct64(Direct64::from_input(version, input, value_count)?),
            24 if value_count <= THREE_BLOCKS_MAX_SIZE => PackedArray::Packed8ThreeBlocks(
                Packed8ThreeBlocks::from_input(version, input, value_count)?,
            ),
            48 if value_count <= THREE_BLOCKS_MAX_SIZE => PackedArray::Packed16ThreeBlocks(
                Packed16ThreeBlocks::from_input(version, input, value_count)?,
            ),
            _ => PackedArray::Packed64(Packed64::from_input(
                version,
                input,
                value_count,
                bits_per_value,
            )?),
        },
    };
    debug!(
        layout = reader.kind(),
        version, bits_per_value, value_count, "loaded packed reader"
    );
    Ok(reader)
}

/// Builds an empty layout for an already validated `(format, bits)` pair.
fn new_mutable(value_count: usize, bits_per_value: u32, format: Format) -> PackedArray {
    match format {
        Format::PackedSingleBlock => {
            PackedArray::Packed64SingleBlock(Packed64SingleBlock::new(value_count, bits_per_value))
        }
        Format::Packed => match bits_per_value {
            8 => PackedArray::Direct8(Direct8::new(value_count)),
            16 => PackedArray::Direct16(Direct16::new(value_count)),
            32 => PackedArray::Direct32(Direct32::new(value_count)),
            64 => PackedArray::Direct64(Direct64::new(value_count)),
            24 => Packed8ThreeBlocks::new(value_count).map_or_else(
                |_| PackedArray::Packed64(Packed64::new(value_count, 24)),
                PackedArray::Packed8ThreeBlocks,
            ),
            48 => Packed16ThreeBlocks::new(value_count).map_or_else(
                |_| PackedArray::Packed64(Packed64::new(value_count, 48)),
                PackedArray::Packed16ThreeBlocks,
            ),
            _ => PackedArray::Packed64(Packed64::new(value_count, bits_per_value)),
        },
    }
}

/// An all-zero mutable array able to hold `bits_per_value`-bit values,
/// using the fastest layout within `acceptable_overhead_ratio`.
///
/// # Panics
///
/// Panics unless `1 <= bits_per_value <= 64`.
pub fn get_mutable(
    value_count: usize,
    bits_per_value: u32,
    acceptable_overhead_ratio: f32,
) -> PackedArray {
    assert!(
        (1..=64).contains(&bits_per_value),
        "bits_per_value must be in 1..=64, got {bits_per_value}"
    );
    let fab = FormatAndBits::fastest(Some(value_count), bits_per_value, acceptable_overhead_ratio);
    new_mutable(value_count, fab.bits_per_value, fab.format)
}

/// An all-zero mutable array with exactly the requested format and width.
pub fn get_mutable_with_format(
    value_count: usize,
    bits_per_value: u32,
    format: Format,
) -> Result<PackedArray> {
    check_bits_per_value(bits_per_value)?;
    if !format.is_supported(bits_per_value) {
        return Err(PackedIntsError::UnsupportedBitsPerValue {
            format,
            bits_per_value,
        });
    }
    let mutable = new_mutable(value_count, bits_per_value, format);
    debug_assert_eq!(mutable.format(), format);
    debug_assert!(mutable.size() == value_count);
    Ok(mutable)
}

#[cfg(test)]
mod tests {
    use store_io::{DataOutput, write_header};

    use super::*;
    use crate::config::{COMPACT, DEFAULT, FASTEST};
    use crate::format::{VERSION_BYTE_ALIGNED, VERSION_CURRENT, VERSION_START};

    fn stream(version: i32, bits: u32, count: u32, format_id: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        write_header(&mut out, CODEC_NAME, version).unwrap();
        out.write_vint(bits).unwrap();
        out.write_vint(count).unwrap();
        out.write_vint(format_id).unwrap();
        out.write_bytes(payload).unwrap();
        out
    }

    #[test]
    fn dispatches_native_widths() -> Result<()> {
        let cases = [
            (8, "Direct8"),
            (16, "Direct16"),
            (24, "Packed8ThreeBlocks"),
            (32, "Direct32"),
            (48, "Packed16ThreeBlocks"),
            (64, "Direct64"),
            (7, "Packed64"),
            (63, "Packed64"),
        ];
        for (bits, kind) in cases {
            let payload = vec![0u8; Format::Packed.byte_count(VERSION_CURRENT, 5, bits) as usize];
            let bytes = stream(VERSION_CURRENT, bits, 5, Format::PACKED_ID, &payload);
            let mut input = &bytes[..];
            let reader = get_reader(&mut input)?;
            assert_eq!(reader.kind(), kind, "bits={bits}");
            assert_eq!(reader.size(), 5);
            assert_eq!(reader.bits_per_value(), bits);
            assert!(input.is_empty(), "bits={bits}");
        }
        Ok(())
    }

    #[test]
    fn three_bit_example() -> Result<()> {
        let bytes = stream(VERSION_BYTE_ALIGNED, 3, 4, Format::PACKED_ID, &[0xAB, 0x90]);
        let reader = get_reader(&mut &bytes[..])?;
        let values: Vec<u64> = (0..4).map(|i| reader.get(i)).collect();
        assert_eq!(values, vec![5, 2, 7, 1]);
        Ok(())
    }

    #[test]
    fn single_block_dispatch() -> Result<()> {
        let word: u64 = 1 | (2 << 21);
        let bytes = stream(VERSION_START, 21, 2, Format::PACKED_SINGLE_BLOCK_ID, &word.to_be_bytes());
        let reader = get_reader(&mut &bytes[..])?;
        assert_eq!(reader.kind(), "Packed64SingleBlock");
        assert_eq!((reader.get(0), reader.get(1)), (1, 2));
        Ok(())
    }

    #[test]
    fn rejects_bad_headers() {
        let bytes = stream(VERSION_CURRENT + 1, 8, 1, 0, &[1]);
        assert!(matches!(
            get_reader(&mut &bytes[..]),
            Err(PackedIntsError::VersionTooNew { version: 2, max: 1 })
        ));

        let bytes = stream(VERSION_CURRENT, 8, 1, 5, &[1]);
        assert!(matches!(
            get_reader(&mut &bytes[..]),
            Err(PackedIntsError::UnknownFormat(5))
        ));

        let bytes = stream(VERSION_CURRENT, 65, 1, 0, &[1]);
        assert!(matches!(
            get_reader(&mut &bytes[..]),
            Err(PackedIntsError::InvalidBitsPerValue(65))
        ));

        let bytes = stream(VERSION_CURRENT, 0, 1, 0, &[1]);
        assert!(matches!(
            get_reader(&mut &bytes[..]),
            Err(PackedIntsError::InvalidBitsPerValue(0))
        ));

        let mut bytes = stream(VERSION_CURRENT, 8, 1, 0, &[1]);
        bytes[0] ^= 0xFF;
        assert!(matches!(get_reader(&mut &bytes[..]), Err(PackedIntsError::Store(_))));
    }

    #[test]
    fn huge_value_count_is_rejected() {
        let bytes = stream(VERSION_CURRENT, 63, u32::MAX, Format::PACKED_ID, &[0; 16]);
        assert!(matches!(
            get_reader(&mut &bytes[..]),
            Err(PackedIntsError::CapacityExceeded { value_count, .. })
                if value_count == u32::MAX as usize
        ));

        let payload = [0u8; 16];
        let result = get_reader_no_header(
            &mut &payload[..],
            Format::Packed,
            VERSION_CURRENT,
            crate::format::MAX_VALUE_COUNT + 1,
            63,
        );
        assert!(matches!(result, Err(PackedIntsError::CapacityExceeded { .. })));
    }

    #[test]
    fn truncated_payload_fails() {
        let bytes = stream(VERSION_CURRENT, 32, 4, 0, &[0; 10]);
        match get_reader(&mut &bytes[..]) {
            Err(PackedIntsError::Store(e)) => assert!(e.is_eof()),
            other => panic!("expected EOF, got {other:?}"),
        }
    }

    #[test]
    fn mutable_layouts() -> Result<()> {
        assert_eq!(get_mutable(10, 7, FASTEST).kind(), "Direct8");
        assert_eq!(get_mutable(10, 7, COMPACT).kind(), "Packed64");
        assert_eq!(get_mutable(10, 20, DEFAULT).kind(), "Packed8ThreeBlocks");

        let m = get_mutable_with_format(10, 21, Format::PackedSingleBlock)?;
        assert_eq!(m.kind(), "Packed64SingleBlock");
        assert!(matches!(
            get_mutable_with_format(10, 11, Format::PackedSingleBlock),
            Err(PackedIntsError::UnsupportedBitsPerValue { .. })
        ));
        Ok(())
    }

    #[test]
    fn save_then_load() -> Result<()> {
        for bits in [1, 5, 8, 12, 24, 33, 48, 64] {
            let mut m = get_mutable(37, bits, COMPACT);
            for i in 0..37 {
                m.set(i, (i as u64 * 0x5DEE_CE66D) & crate::bit_ops::max_value(bits));
            }
            let mut out = Vec::new();
            m.save(&mut out)?;
            let restored = get_reader(&mut &out[..])?;
            for i in 0..37 {
                assert_eq!(restored.get(i), m.get(i), "bits={bits} index={i}");
            }
        }
        Ok(())
    }
}
