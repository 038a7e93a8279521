//! Property-based tests for the stream primitives.

use proptest::prelude::*;
use std::io::{Seek, SeekFrom};
use store_io::{DataInput, DataOutput, check_header, write_header};

#[derive(Clone, Debug)]
enum Field {
    Byte(u8),
    Short(u16),
    Int(u32),
    Long(u64),
    VInt(u32),
    VLong(u64),
    Str(String),
}

fn field_strategy() -> impl Strategy<Value = Field> {
    prop_oneof![
        any::<u8>().prop_map(Field::Byte),
        any::<u16>().prop_map(Field::Short),
        any::<u32>().prop_map(Field::Int),
        any::<u64>().prop_map(Field::Long),
        any::<u32>().prop_map(Field::VInt),
        any::<u64>().prop_map(Field::VLong),
        "[a-zA-Z0-9 ]{0,40}".prop_map(Field::Str),
    ]
}

fn write_field(out: &mut Vec<u8>, field: &Field) -> store_io::Result<()> {
    match field {
        Field::Byte(v) => out.write_byte(*v),
        Field::Short(v) => out.write_short(*v),
        Field::Int(v) => out.write_int(*v),
        Field::Long(v) => out.write_long(*v),
        Field::VInt(v) => out.write_vint(*v),
        Field::VLong(v) => out.write_vlong(*v),
        Field::Str(v) => out.write_string(v),
    }
}

fn check_field(input: &mut &[u8], field: &Field) -> Result<(), TestCaseError> {
    match field {
        Field::Byte(v) => prop_assert_eq!(input.read_byte().unwrap(), *v),
        Field::Short(v) => prop_assert_eq!(input.read_short().unwrap(), *v),
        Field::Int(v) => prop_assert_eq!(input.read_int().unwrap(), *v),
        Field::Long(v) => prop_assert_eq!(input.read_long().unwrap(), *v),
        Field::VInt(v) => prop_assert_eq!(input.read_vint().unwrap(), *v),
        Field::VLong(v) => prop_assert_eq!(input.read_vlong().unwrap(), *v),
        Field::Str(v) => prop_assert_eq!(&input.read_string().unwrap(), v),
    }
    Ok(())
}

proptest! {
    // -------------------------------------------------------------
    // 1. Any sequence of fields reads back in the order written.
    // -------------------------------------------------------------
    #[test]
    fn prop_mixed_fields_roundtrip(ref fields in prop::collection::vec(field_strategy(), 0..64)) {
        let mut out = Vec::new();
        for f in fields {
            write_field(&mut out, f).unwrap();
        }

        let mut input = out.as_slice();
        for f in fields {
            check_field(&mut input, f)?;
        }
        prop_assert!(input.is_empty());
    }

    // -------------------------------------------------------------
    // 2. Small vints take one byte, and size grows by 7 bits per byte.
    // -------------------------------------------------------------
    #[test]
    fn prop_vint_length(v in any::<u32>()) {
        let mut out = Vec::new();
        out.write_vint(v).unwrap();
        let significant = 32 - v.leading_zeros() as usize;
        let expected = significant.div_ceil(7).max(1);
        prop_assert_eq!(out.len(), expected);
    }

    // -------------------------------------------------------------
    // 3. Truncating a written long anywhere fails with EOF.
    // -------------------------------------------------------------
    #[test]
    fn prop_truncated_long_is_eof(v in any::<u64>(), cut in 0usize..8) {
        let mut out = Vec::new();
        out.write_long(v).unwrap();
        out.truncate(cut);
        let mut input = out.as_slice();
        prop_assert!(input.read_long().unwrap_err().is_eof());
    }

    // -------------------------------------------------------------
    // 4. Headers only accept versions in the requested window.
    // -------------------------------------------------------------
    #[test]
    fn prop_header_window(version in -4i32..8, min in 0i32..3, span in 0i32..3) {
        let max = min + span;
        let mut out = Vec::new();
        write_header(&mut out, "PackedInts", version).unwrap();
        let result = check_header(&mut out.as_slice(), "PackedInts", min, max);
        prop_assert_eq!(result.is_ok(), (min..=max).contains(&version));
    }
}

#[test]
fn file_backed_roundtrip() -> store_io::Result<()> {
    let mut file = tempfile::tempfile()?;
    write_header(&mut file, "PackedInts", 1)?;
    file.write_vint(12)?;
    file.write_long(u64::MAX - 1)?;

    file.seek(SeekFrom::Start(0))?;
    assert_eq!(check_header(&mut file, "PackedInts", 0, 1)?, 1);
    assert_eq!(file.read_vint()?, 12);
    assert_eq!(file.read_long()?, u64::MAX - 1);
    assert!(file.read_byte().unwrap_err().is_eof());
    Ok(())
}
