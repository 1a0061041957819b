//! Frame and dialect codec benchmarks.
//!
//! Measures the per-command cost of the wire path at payload sizes from a
//! bare command up to a screenshot-sized reply.
//!
//! Run with: cargo bench --bench frame_codec
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use marionette_transport::transport::frame::{encode_frame, read_frame};
use marionette_transport::{Command, Dialect, MessageId};
use serde_json::{Value, json};
use tokio::io::BufReader;
use tokio::runtime::Runtime;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const PAYLOAD_SIZES: &[usize] = &[64, 4 * 1024, 256 * 1024, 4 * 1024 * 1024];

const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

// ============================================================================
// Benchmark: Frame Decode
// ============================================================================

fn bench_read_frame(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");

    let mut group = c.benchmark_group("read_frame");

    for &size in PAYLOAD_SIZES {
        let frame = encode_frame(&vec![b'x'; size]);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &frame, |b, frame| {
            let frame: &[u8] = frame;
            b.to_async(&rt).iter(|| async move {
                let mut reader = BufReader::new(frame);
                black_box(read_frame(&mut reader, MAX_FRAME_SIZE).await.expect("frame"))
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Frame Encode
// ============================================================================

fn bench_encode_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_frame");

    for &size in PAYLOAD_SIZES {
        let payload = vec![b'x'; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| black_box(encode_frame(payload)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Dialects
// ============================================================================

fn bench_dialects(c: &mut Criterion) {
    let command = Command::new(
        "WebDriver:ExecuteScript",
        json!({"script": "return document.title", "args": [], "newSandbox": false}),
    )
    .with_id(MessageId::new(1));

    let screenshot = Value::String("A".repeat(256 * 1024));
    let reply = serde_json::to_vec(&json!([1, 1, null, {"value": screenshot}])).expect("reply");

    let mut group = c.benchmark_group("dialect");

    for dialect in [Dialect::Legacy, Dialect::Current] {
        group.bench_function(BenchmarkId::new("encode", format!("{dialect:?}")), |b| {
            b.iter(|| black_box(dialect.encode(&command).expect("encode")));
        });
    }

    group.throughput(Throughput::Bytes(reply.len() as u64));
    group.bench_function("decode/Current/screenshot", |b| {
        b.iter(|| black_box(Dialect::Current.decode(&reply).expect("decode")));
    });

    group.finish();
}

criterion_group!(benches, bench_read_frame, bench_encode_frame, bench_dialects);
criterion_main!(benches);
