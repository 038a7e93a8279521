//! Property-based and randomized tests across every layout.

use packed_ints::{
    COMPACT, DEFAULT, FAST, FASTEST, Format, FormatAndBits, GrowableWriter, Mutable,
    PackedArray, PackedIntsError, Reader, VERSION_BYTE_ALIGNED, VERSION_CURRENT, VERSION_START,
    bits_required, get_mutable, get_mutable_with_format, get_reader, get_reader_iterator,
    get_reader_no_header, get_writer, max_value,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use store_io::{DataOutput, write_header};

fn random_values(rng: &mut StdRng, count: usize, bits: u32) -> Vec<u64> {
    let mask = max_value(bits);
    (0..count).map(|_| rng.random::<u64>() & mask).collect()
}

fn collect(reader: &PackedArray) -> Vec<u64> {
    (0..reader.size()).map(|i| reader.get(i)).collect()
}

// -----------------------------------------------------------------------------
// Exhaustive width x count grid
// -----------------------------------------------------------------------------

#[test]
fn every_width_roundtrips_through_save() -> Result<(), PackedIntsError> {
    let mut rng = StdRng::seed_from_u64(42);
    for bits in 1..=64 {
        for count in [0usize, 1, 17, 10_000] {
            let values = random_values(&mut rng, count, bits);
            for ratio in [COMPACT, FAST] {
                let mut m = get_mutable(count, bits, ratio);
                for (i, &v) in values.iter().enumerate() {
                    m.set(i, v);
                }
                let mut out = Vec::new();
                m.save(&mut out)?;

                let mut input = out.as_slice();
                let reader = get_reader(&mut input)?;
                assert!(input.is_empty(), "bits={bits} count={count}");
                assert_eq!(reader.size(), count);
                assert!(reader.bits_per_value() >= bits);
                assert_eq!(collect(&reader), values, "bits={bits} count={count}");
            }
        }
    }
    Ok(())
}

#[test]
fn native_widths_match_general_layout() -> Result<(), PackedIntsError> {
    let mut rng = StdRng::seed_from_u64(7);
    for bits in [8, 16, 24, 32, 48, 64] {
        let values = random_values(&mut rng, 333, bits);
        let mut specialized = get_mutable(values.len(), bits, COMPACT);
        let mut general = PackedArray::Packed64(packed_ints::Packed64::new(values.len(), bits));
        for (i, &v) in values.iter().enumerate() {
            specialized.set(i, v);
            general.set(i, v);
        }
        assert_ne!(specialized.kind(), "Packed64", "bits={bits}");

        let mut a = Vec::new();
        let mut b = Vec::new();
        specialized.write_payload(&mut a)?;
        general.write_payload(&mut b)?;
        assert_eq!(a, b, "bits={bits}");
    }
    Ok(())
}

#[test]
fn single_block_widths_roundtrip() -> Result<(), PackedIntsError> {
    let mut rng = StdRng::seed_from_u64(99);
    for &bits in &packed_ints::SUPPORTED_BITS_PER_VALUE {
        let values = random_values(&mut rng, 1_001, bits);
        let mut m = get_mutable_with_format(values.len(), bits, Format::PackedSingleBlock)?;
        let written = m.bulk_set(0, &values);
        assert!(written > 0);
        let mut done = written;
        while done < values.len() {
            done += m.bulk_set(done, &values[done..]);
        }
        let mut out = Vec::new();
        m.save(&mut out)?;
        let reader = get_reader(&mut out.as_slice())?;
        assert_eq!(reader.format(), Format::PackedSingleBlock);
        assert_eq!(collect(&reader), values, "bits={bits}");
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Legacy streams
// -----------------------------------------------------------------------------

#[test]
fn legacy_streams_land_on_next_record() -> Result<(), PackedIntsError> {
    let mut rng = StdRng::seed_from_u64(3);
    for bits in [3, 8, 16, 24, 32, 48, 61] {
        for count in [1usize, 5, 9] {
            let values = random_values(&mut rng, count, bits);
            let mut packed = packed_ints::Packed64::new(count, bits);
            for (i, &v) in values.iter().enumerate() {
                packed.set(i, v);
            }

            // word-aligned payload followed by a sentinel record
            let mut out = Vec::new();
            write_header(&mut out, packed_ints::CODEC_NAME, VERSION_START)?;
            out.write_vint(bits)?;
            out.write_vint(count as u32)?;
            out.write_vint(Format::PACKED_ID)?;
            for &block in packed.blocks() {
                out.write_long(block)?;
            }
            out.write_int(0xDEAD_BEEF)?;

            let mut input = out.as_slice();
            let reader = get_reader(&mut input)?;
            assert_eq!(collect(&reader), values, "bits={bits} count={count}");
            assert_eq!(input, &0xDEAD_BEEFu32.to_be_bytes(), "bits={bits} count={count}");
        }
    }
    Ok(())
}

#[test]
fn unknown_format_id_is_fatal() {
    let mut out = Vec::new();
    write_header(&mut out, packed_ints::CODEC_NAME, VERSION_CURRENT).unwrap();
    out.write_vint(8).unwrap();
    out.write_vint(2).unwrap();
    out.write_vint(3).unwrap();
    out.write_bytes(&[1, 2]).unwrap();
    assert!(matches!(
        get_reader(&mut out.as_slice()),
        Err(PackedIntsError::UnknownFormat(3))
    ));
}

// -----------------------------------------------------------------------------
// Properties
// -----------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_byte_count_alignment(count in 0usize..100_000, bits in 1u32..=64) {
        let current = Format::Packed.byte_count(VERSION_BYTE_ALIGNED, count, bits);
        let legacy = Format::Packed.byte_count(VERSION_START, count, bits);
        let total_bits = count as u64 * u64::from(bits);

        prop_assert!(current * 8 >= total_bits);
        prop_assert!(current * 8 < total_bits + 8);
        prop_assert_eq!(legacy % 8, 0);
        prop_assert!(legacy >= current);
        prop_assert!(legacy < current + 8);
        prop_assert_eq!(
            Format::Packed.long_count(VERSION_BYTE_ALIGNED, count, bits) as u64,
            legacy / 8
        );
    }

    #[test]
    fn prop_byte_count_monotonic(count in 0usize..100_000, bits in 1u32..64) {
        for version in [VERSION_START, VERSION_CURRENT] {
            let here = Format::Packed.byte_count(version, count, bits);
            prop_assert!(Format::Packed.byte_count(version, count + 1, bits) >= here);
            prop_assert!(Format::Packed.byte_count(version, count, bits + 1) >= here);
        }
    }

    #[test]
    fn prop_fastest_within_budget(
        count in 0usize..1_000_000,
        bits in 1u32..=64,
        ratio in prop_oneof![Just(COMPACT), Just(DEFAULT), Just(FAST), Just(FASTEST), 0.0f32..7.0],
    ) {
        let fab = FormatAndBits::fastest(Some(count), bits, ratio);
        prop_assert!(fab.bits_per_value >= bits);
        prop_assert!(fab.format.is_supported(fab.bits_per_value));
        let wasted = (fab.bits_per_value - bits) as f32
            + fab.format.overhead_per_value(fab.bits_per_value);
        prop_assert!(wasted <= ratio * bits as f32 + 1e-3);
    }

    #[test]
    fn prop_growable_preserves_values(
        values in prop::collection::vec(any::<u64>().prop_map(|v| v >> (v % 64)), 1..300),
        ratio in prop_oneof![Just(COMPACT), Just(DEFAULT), Just(FASTEST)],
    ) {
        let mut w = GrowableWriter::new(1, values.len(), ratio);
        let mut widest = 1;
        for (i, &v) in values.iter().enumerate() {
            w.set(i, v);
            widest = widest.max(bits_required(v));
            prop_assert!(w.bits_per_value() >= widest);
            for (j, &expected) in values[..=i].iter().enumerate() {
                prop_assert_eq!(w.get(j), expected);
            }
        }
    }

    #[test]
    fn prop_version_window(version in -1_000i32..1_000) {
        let mut out = Vec::new();
        write_header(&mut out, packed_ints::CODEC_NAME, version).unwrap();
        out.write_vint(8).unwrap();
        out.write_vint(1).unwrap();
        out.write_vint(0).unwrap();
        out.write_bytes(&[0x2A; 8]).unwrap();

        let result = get_reader(&mut out.as_slice());
        match version {
            v if v < VERSION_START => {
                let is_too_old = matches!(result, Err(PackedIntsError::VersionTooOld { .. }));
                prop_assert!(is_too_old);
            }
            v if v > VERSION_CURRENT => {
                let is_too_new = matches!(result, Err(PackedIntsError::VersionTooNew { .. }));
                prop_assert!(is_too_new);
            }
            _ => prop_assert_eq!(result.unwrap().get(0), 0x2A),
        }
    }

    #[test]
    fn prop_writer_and_iterator_agree(
        bits in 1u32..=64,
        seed in any::<u64>(),
        count in 0usize..2_000,
        mem in 0usize..4096,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let values = random_values(&mut rng, count, bits);

        let mut out = Vec::new();
        let mut writer = get_writer(&mut out, count, bits, COMPACT).unwrap();
        for &v in &values {
            writer.add(v).unwrap();
        }
        writer.finish().unwrap();
        drop(writer);

        let reader = get_reader(&mut out.as_slice()).unwrap();
        prop_assert_eq!(collect(&reader), values.clone());

        let iter = get_reader_iterator(out.as_slice(), mem).unwrap();
        let streamed: Vec<u64> = iter.collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(streamed, values);
    }

    #[test]
    fn prop_bulk_get_matches_get(
        bits in 1u32..=64,
        seed in any::<u64>(),
        count in 1usize..1_500,
        start in 0usize..1_500,
        len in 0usize..600,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let values = random_values(&mut rng, count, bits);
        let mut m = get_mutable(count, bits, COMPACT);
        for (i, &v) in values.iter().enumerate() {
            m.set(i, v);
        }

        let start = start % count;
        let mut buf = vec![0u64; len];
        let read = m.bulk_get(start, &mut buf);
        prop_assert!(read <= len.min(count - start));
        if len > 0 {
            prop_assert!(read > 0);
        }
        prop_assert_eq!(&buf[..read], &values[start..start + read]);
    }

    #[test]
    fn prop_fill_sets_exact_range(
        bits in 1u32..=64,
        count in 1usize..800,
        a in 0usize..800,
        b in 0usize..800,
        value in any::<u64>(),
    ) {
        let (from, to) = {
            let (x, y) = (a % (count + 1), b % (count + 1));
            (x.min(y), x.max(y))
        };
        let value = value & max_value(bits);
        let mut m = get_mutable(count, bits, COMPACT);
        for i in 0..count {
            m.set(i, 1);
        }
        m.fill(from, to, value);
        for i in 0..count {
            let expected = if (from..to).contains(&i) { value } else { 1 };
            prop_assert_eq!(m.get(i), expected);
        }
    }

    #[test]
    fn prop_headerless_read_matches_payload(bits in 1u32..=64, count in 0usize..500) {
        let values: Vec<u64> = (0..count as u64).map(|i| i & max_value(bits)).collect();
        let mut m = get_mutable(count, bits, COMPACT);
        for (i, &v) in values.iter().enumerate() {
            m.set(i, v);
        }
        let mut payload = Vec::new();
        m.write_payload(&mut payload).unwrap();
        let reader = get_reader_no_header(
            &mut payload.as_slice(),
            m.format(),
            VERSION_CURRENT,
            count,
            m.bits_per_value(),
        )
        .unwrap();
        prop_assert_eq!(collect(&reader), values);
    }
}
