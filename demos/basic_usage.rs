//! Basic usage example for bitbuf
//!
//! Run with: cargo run --example basic_usage

use std::time::{Duration, UNIX_EPOCH};

use bitbuf::*;

wire_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Channel: u8 {
        Left = 0,
        Right = 1,
    }
}

wire_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Source: u32 {
        Sensor = 1,
        Relay = 2,
        Archive = 500,
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<()> {
    println!("bitbuf Basic Usage Example");
    println!("==========================");

    // Example 1: Flags packed into a single byte
    println!("\n1. Packed Flags:");
    {
        let flags = [true, false, true, true, false, false, true, false];
        let mut writer = BitWriter::new();
        for flag in flags {
            writer.write_bool(flag)?;
        }

        println!(
            "  {} flags -> {} byte(s): {}",
            flags.len(),
            writer.byte_len(),
            hex(writer.as_bytes())
        );

        let mut reader = writer.reader();
        let decoded: Vec<bool> = (0..flags.len())
            .map(|_| reader.read_bool())
            .collect::<Result<_>>()?;
        println!("  Decoded: {:?}", decoded);
    }

    // Example 2: Fields of arbitrary bit width
    println!("\n2. Arbitrary Widths:");
    {
        let mut writer = BitWriter::new();
        writer
            .write_u8_bits(5, 3)? // 3-bit version
            .write_u16_bits(1_000, 10)? // 10-bit id
            .write_i8_bits(-7, 5)? // 5-bit signed delta
            .write_u32_bits(123_456, 17)?; // 17-bit counter

        println!("  35 bits -> {} bytes: {}", writer.byte_len(), hex(writer.as_bytes()));

        let mut reader = writer.reader();
        println!(
            "  Decoded: version={}, id={}, delta={}, counter={}",
            reader.read_u8_bits(3)?,
            reader.read_u16_bits(10)?,
            reader.read_i8_bits(5)?,
            reader.read_u32_bits(17)?
        );
    }

    // Example 3: Sensor sample with varints, ranges, enums and strings
    println!("\n3. Sensor Sample:");
    {
        let mut writer = BitWriter::new();
        writer.write_var_u32(67890)?; // sequence number
        writer.write_epoch_millis(UNIX_EPOCH + Duration::from_millis(1_700_000_001_000))?;
        writer.write_var_i64(-25_500)?; // calibration offset
        writer
            .write_ranged_i32(1, 1_000, 200)? // level
            .write_enum_bits(Channel::Right, 1)?
            .write_enum(Source::Archive)?
            .write_unit_f32(0.75, 8)? // duty cycle
            .write_str("north")?;

        let bytes = writer.to_vec();
        println!("  Encoded {} bits in {} bytes", writer.bit_len(), bytes.len());

        let mut reader = BitReader::new(&bytes);
        let seq = reader.read_var_u32()?;
        let time = reader.read_epoch_millis()?;
        let offset = reader.read_var_i64()?;
        let level = reader.read_ranged_i32(1, 1_000)?;
        let channel = reader.read_enum_bits::<Channel>(1)?;
        let source = reader.read_enum::<Source>()?;
        let duty = reader.read_unit_f32(8)?;
        let label = reader.read_string()?;
        println!(
            "  Decoded: seq={}, time={:?}, offset={}, level={}, channel={:?}, source={:?}, duty={:.3}, label={}",
            seq,
            time.duration_since(UNIX_EPOCH).unwrap_or_default(),
            offset,
            level,
            channel,
            source,
            duty,
            label
        );
    }

    // Example 4: Peeking
    println!("\n4. Peeking:");
    {
        let mut writer = BitWriter::new();
        writer.write_str("header")?.write_u16(0xBEEF)?;
        let mut reader = writer.reader();

        let peeked = reader.peek_string()?;
        println!("  Peeked {:?}, position still {}", peeked, reader.position());

        let consumed = reader.read_string()?;
        println!("  Read {:?}, position now {}", consumed, reader.position());
        println!("  Trailer: {:#06X}", reader.read_u16()?);
    }

    // Example 5: Back-patching a count
    println!("\n5. Back-patching:");
    {
        let mut writer = BitWriter::new();
        writer.write_u8(0)?; // count placeholder
        let readings = [12.5f32, -3.25, 40.0];
        for reading in readings {
            writer.write_ranged_f32(reading, -50.0, 50.0, 12)?;
        }
        writer.write_u8_at(0, readings.len() as u8)?;

        let mut reader = writer.reader();
        let count = reader.read_u8()?;
        print!("  {} readings:", count);
        for _ in 0..count {
            print!(" {:.2}", reader.read_ranged_f32(-50.0, 50.0, 12)?);
        }
        println!();
    }

    // Example 6: Error handling
    println!("\n6. Error Handling:");
    {
        let bytes = [0xFFu8];
        let mut reader = BitReader::new(&bytes);
        reader.read_u8_bits(6)?;
        match reader.read_u8_bits(4) {
            Err(e) => println!("  Reading 4 bits with 2 left: {}", e),
            Ok(v) => println!("  Unexpected value {}", v),
        }
        println!("  Cursor unchanged at bit {}", reader.position());

        let mut writer = BitWriter::new();
        match writer.write_ranged_i32(0, 10, 42) {
            Err(e) => println!("  Writing 42 into [0, 10]: {}", e),
            Ok(_) => println!("  Unexpected success"),
        }
    }

    println!("\nAll examples completed successfully!");
    Ok(())
}
