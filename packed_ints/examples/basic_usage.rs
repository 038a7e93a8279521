use packed_ints::{
    COMPACT, DEFAULT, FASTEST, Format, GrowableWriter, Mutable, PackedIntsError, Reader,
    get_mutable, get_reader, get_reader_iterator, get_writer,
};

fn main() -> Result<(), PackedIntsError> {
    println!("=== Packed Ints Examples ===\n");

    example_layouts();
    example_save_and_load()?;
    example_growable();
    example_streaming()?;

    Ok(())
}

fn example_layouts() {
    println!("Example 1: Layout chosen for 20-bit values");

    for (label, ratio) in [("compact", COMPACT), ("default", DEFAULT), ("fastest", FASTEST)] {
        let array = get_mutable(1_000, 20, ratio);
        let bytes = array
            .format()
            .byte_count(packed_ints::VERSION_CURRENT, array.size(), array.bits_per_value());
        println!(
            "  {label:>8}: {} at {} bits, {} bytes",
            array.kind(),
            array.bits_per_value(),
            bytes
        );
    }
    println!();
}

fn example_save_and_load() -> Result<(), PackedIntsError> {
    println!("Example 2: Document lengths saved and restored (11 bits each)");

    let lengths = [120u64, 2047, 5, 980, 33];
    let mut array = get_mutable(lengths.len(), 11, COMPACT);
    for (i, &len) in lengths.iter().enumerate() {
        array.set(i, len);
    }

    let mut buf = Vec::new();
    array.save(&mut buf)?;
    println!("  Serialized {} values into {} bytes", array.size(), buf.len());

    let restored = get_reader(&mut buf.as_slice())?;
    for i in 0..restored.size() {
        println!("  Doc {i}: {}", restored.get(i));
    }
    println!();

    Ok(())
}

fn example_growable() {
    println!("Example 3: Term frequencies of unknown magnitude");

    let mut freqs = GrowableWriter::new(1, 4, DEFAULT);
    for (i, freq) in [1u64, 3, 250, 100_000].into_iter().enumerate() {
        freqs.set(i, freq);
        println!(
            "  Stored {freq:>6}, now {} bits per value ({})",
            freqs.bits_per_value(),
            freqs.mutable().kind()
        );
    }
    println!();
}

fn example_streaming() -> Result<(), PackedIntsError> {
    println!("Example 4: Streaming positions through a bounded buffer");

    let count = 10_000;
    let mut buf = Vec::new();
    let mut writer = get_writer(&mut buf, count, 14, COMPACT)?;
    for i in 0..count as u64 {
        writer.add((i * 3) % (1 << 14))?;
    }
    writer.finish()?;
    let format: Format = writer.format();
    drop(writer);
    println!("  Wrote {count} values as {format:?}, {} bytes", buf.len());

    let mut sum = 0u64;
    for value in get_reader_iterator(buf.as_slice(), 256)? {
        sum += value?;
    }
    println!("  Sum read back: {sum}");

    Ok(())
}
