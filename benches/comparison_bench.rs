//! Size and speed of a packed telemetry batch against byte-aligned serializers
//!
//! The bitbuf layout spends only the bits each field's range needs: a 10-bit
//! node id, 3-bit mode, quantized battery and temperature, a ranged signal
//! strength and 9-bit signed deltas. The serde formats and borsh encode the
//! same frames with whole-byte primitives.
//!
//! Run with: cargo bench --bench comparison_bench

use bitbuf::{BitReader, BitWriter, Result};
use borsh::{BorshDeserialize, BorshSerialize};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde::{Deserialize, Serialize};

const BATCH: usize = 256;

const NODE_BITS: u32 = 10;
const MODE_BITS: u32 = 3;
const BATTERY_BITS: u32 = 10;
const TEMP_MIN: f32 = -40.0;
const TEMP_MAX: f32 = 85.0;
const TEMP_BITS: u32 = 12;
const RSSI_MIN: i32 = -120;
const RSSI_MAX: i32 = 0;
const MAX_DELTAS: i32 = 15;
const DELTA_BITS: u32 = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
struct TelemetryFrame {
    node: u16,
    seq: u32,
    online: bool,
    charging: bool,
    mode: u8,
    battery: f32,
    temperature: f32,
    rssi: i32,
    deltas: Vec<i16>,
}

fn sample_batch() -> Vec<TelemetryFrame> {
    (0..BATCH as u32)
        .map(|i| TelemetryFrame {
            node: (i * 37 % 1024) as u16,
            seq: 40_000 + i * 3,
            online: i % 7 != 0,
            charging: i % 5 == 0,
            mode: (i % 8) as u8,
            battery: (i % 100) as f32 / 99.0,
            temperature: -12.5 + (i % 60) as f32 * 1.25,
            rssi: -((i % 110) as i32) - 10,
            deltas: (0..(i % 9) as i16)
                .map(|d| if i % 2 == 0 { d * 29 - 100 } else { 100 - d * 29 })
                .collect(),
        })
        .collect()
}

fn pack_frame(frame: &TelemetryFrame, writer: &mut BitWriter) -> Result<()> {
    writer
        .write_u16_bits(frame.node, NODE_BITS)?
        .write_bool(frame.online)?
        .write_bool(frame.charging)?
        .write_u8_bits(frame.mode, MODE_BITS)?
        .write_unit_f32(frame.battery, BATTERY_BITS)?
        .write_ranged_f32(frame.temperature, TEMP_MIN, TEMP_MAX, TEMP_BITS)?
        .write_ranged_i32(RSSI_MIN, RSSI_MAX, frame.rssi)?
        .write_ranged_i32(0, MAX_DELTAS, frame.deltas.len() as i32)?;
    for &delta in &frame.deltas {
        writer.write_i16_bits(delta, DELTA_BITS)?;
    }
    writer.write_var_u32(frame.seq)?;
    Ok(())
}

fn unpack_frame(reader: &mut BitReader<'_>) -> Result<TelemetryFrame> {
    let node = reader.read_u16_bits(NODE_BITS)?;
    let online = reader.read_bool()?;
    let charging = reader.read_bool()?;
    let mode = reader.read_u8_bits(MODE_BITS)?;
    let battery = reader.read_unit_f32(BATTERY_BITS)?;
    let temperature = reader.read_ranged_f32(TEMP_MIN, TEMP_MAX, TEMP_BITS)?;
    let rssi = reader.read_ranged_i32(RSSI_MIN, RSSI_MAX)?;
    let count = reader.read_ranged_i32(0, MAX_DELTAS)?;
    let deltas = (0..count)
        .map(|_| reader.read_i16_bits(DELTA_BITS))
        .collect::<Result<Vec<_>>>()?;
    let seq = reader.read_var_u32()?;
    Ok(TelemetryFrame { node, seq, online, charging, mode, battery, temperature, rssi, deltas })
}

fn pack_batch(frames: &[TelemetryFrame], writer: &mut BitWriter) -> Result<()> {
    writer.clear();
    writer.write_var_u32(frames.len() as u32)?;
    for frame in frames {
        pack_frame(frame, writer)?;
    }
    Ok(())
}

fn unpack_batch(bytes: &[u8]) -> Result<Vec<TelemetryFrame>> {
    let mut reader = BitReader::new(bytes);
    let count = reader.read_var_u32()?;
    (0..count).map(|_| unpack_frame(&mut reader)).collect()
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Bitbuf,
    Bincode,
    Postcard,
    MessagePack,
    Borsh,
    Json,
}

impl Format {
    const ALL: [Format; 6] = [
        Format::Bitbuf,
        Format::Bincode,
        Format::Postcard,
        Format::MessagePack,
        Format::Borsh,
        Format::Json,
    ];

    fn name(self) -> &'static str {
        match self {
            Format::Bitbuf => "bitbuf",
            Format::Bincode => "bincode",
            Format::Postcard => "postcard",
            Format::MessagePack => "rmp_serde",
            Format::Borsh => "borsh",
            Format::Json => "serde_json",
        }
    }

    fn encode(self, frames: &Vec<TelemetryFrame>) -> Vec<u8> {
        match self {
            Format::Bitbuf => {
                let mut writer = BitWriter::new();
                pack_batch(frames, &mut writer).unwrap();
                writer.into_vec()
            }
            Format::Bincode => bincode::serialize(frames).unwrap(),
            Format::Postcard => postcard::to_allocvec(frames).unwrap(),
            Format::MessagePack => rmp_serde::to_vec(frames).unwrap(),
            Format::Borsh => frames.try_to_vec().unwrap(),
            Format::Json => serde_json::to_vec(frames).unwrap(),
        }
    }

    fn decode(self, bytes: &[u8]) -> Vec<TelemetryFrame> {
        match self {
            Format::Bitbuf => unpack_batch(bytes).unwrap(),
            Format::Bincode => bincode::deserialize(bytes).unwrap(),
            Format::Postcard => postcard::from_bytes(bytes).unwrap(),
            Format::MessagePack => rmp_serde::from_slice(bytes).unwrap(),
            Format::Borsh => Vec::<TelemetryFrame>::try_from_slice(bytes).unwrap(),
            Format::Json => serde_json::from_slice(bytes).unwrap(),
        }
    }
}

fn report_sizes(frames: &Vec<TelemetryFrame>) {
    println!("\n=== Encoded size of {} telemetry frames ===", frames.len());
    let packed = Format::Bitbuf.encode(frames).len();
    for format in Format::ALL {
        let len = format.encode(frames).len();
        println!(
            "{:>12}: {:>7} bytes  {:>6.1} per frame  {:>5.2}x bitbuf",
            format.name(),
            len,
            len as f64 / frames.len() as f64,
            len as f64 / packed as f64
        );
    }
}

fn bench_encode(c: &mut Criterion) {
    let frames = sample_batch();
    report_sizes(&frames);

    let mut group = c.benchmark_group("telemetry_encode");
    group.throughput(Throughput::Elements(frames.len() as u64));

    // Reuse one writer so the bitbuf numbers exclude allocation
    group.bench_with_input(BenchmarkId::new("bitbuf_reused", BATCH), &frames, |b, frames| {
        let mut writer = BitWriter::with_capacity(BATCH * 16);
        b.iter(|| {
            pack_batch(black_box(frames), &mut writer).unwrap();
            black_box(writer.byte_len());
        });
    });

    for format in Format::ALL {
        group.bench_with_input(BenchmarkId::new(format.name(), BATCH), &frames, |b, frames| {
            b.iter(|| black_box(format.encode(black_box(frames))));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let frames = sample_batch();

    let mut group = c.benchmark_group("telemetry_decode");
    group.throughput(Throughput::Elements(frames.len() as u64));

    for format in Format::ALL {
        let encoded = format.encode(&frames);
        group.bench_with_input(BenchmarkId::new(format.name(), BATCH), &encoded, |b, bytes| {
            b.iter(|| black_box(format.decode(black_box(bytes))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
