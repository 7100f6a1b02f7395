//! Throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mtkgps_core::core::protocol::{pmtk, validate, LineBuffer, SentenceKind, ValidityMask};
use mtkgps_core::ReceiverSession;

/// One second of output from a receiver running the default masks
const BURST: &[&str] = &[
    "$GPGGA,064951.000,2307.1256,N,12016.4438,E,1,8,0.95,39.9,M,17.8,M,,*63",
    "$GPGSA,A,3,29,21,26,15,18,09,06,10,,,,,2.32,0.95,2.11*00",
    "$GPGSV,3,1,09,29,36,029,42,21,46,314,43,26,44,020,43,15,21,321,39*7D",
    "$GPGSV,3,2,09,18,26,314,40,09,57,170,44,06,20,229,37,10,26,084,37*77",
    "$GPGSV,3,3,09,07,,,26*73",
    "$GPRMC,064951.000,A,2307.1256,N,12016.4438,E,0.03,165.48,260406,3.05,W,A*2C",
    "$GPVTG,165.48,T,,M,0.03,N,0.06,K,A*36",
    "$PMTK001,314,3*36",
];

fn burst() -> String {
    let mut out = String::new();
    for line in BURST {
        out.push_str(line);
        out.push_str("\r\n");
    }
    out
}

fn validate_benchmark(c: &mut Criterion) {
    let data = burst();
    let lines: Vec<&str> = data.lines().collect();

    let mut group = c.benchmark_group("validate");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("checksum", |b| {
        b.iter(|| {
            let ok = lines.iter().filter(|l| validate(black_box(l)).is_ok()).count();
            black_box(ok)
        })
    });

    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let data = burst();

    let mut group = c.benchmark_group("session");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("reassemble_and_parse", |b| {
        let mut session = ReceiverSession::new();
        let mut lines = LineBuffer::new();
        b.iter(|| {
            let mut decoded = 0;
            for &byte in black_box(data.as_bytes()) {
                if let Some(line) = lines.push(byte) {
                    if session.parse(&line).is_ok() {
                        decoded += 1;
                    }
                }
            }
            black_box(decoded)
        })
    });

    group.finish();
}

fn encode_benchmark(c: &mut Criterion) {
    let every_fix: ValidityMask = [SentenceKind::Rmc, SentenceKind::Gga].into_iter().collect();
    let fifth: ValidityMask = [SentenceKind::Gsa, SentenceKind::Gsv].into_iter().collect();
    let masks = [every_fix, ValidityMask::new(), ValidityMask::new(), ValidityMask::new(), fifth];

    c.bench_function("encode_output_rates", |b| {
        b.iter(|| {
            let line = pmtk::output_rates(black_box(&masks)).unwrap();
            black_box(line)
        })
    });
}

criterion_group!(benches, validate_benchmark, decode_benchmark, encode_benchmark);
criterion_main!(benches);
