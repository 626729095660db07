//! Performance benchmarks for the period-file format.
//!
//! Run with: cargo bench
//!
//! These benchmarks establish baseline performance metrics for:
//! - Serializing a single entry
//! - Parsing period files with a growing number of entries

use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use devjournal::journal_core::{
    format, parse_entries, EntryKind, EntryRecord, PeriodGranularity, PeriodKey,
};

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 1)
        .expect("valid date")
        .and_hms_opt(8, 0, 0)
        .expect("valid time")
}

fn sample_record(at: NaiveDateTime) -> EntryRecord {
    let mut record = EntryRecord::new(EntryKind::CodingSession, at).with_duration("1h 30m");
    record
        .set_field("Worked on", "Parser for the journal format\nwith escaping")
        .expect("known field");
    record
        .set_field("Challenges", "## lines that look like headings\n---")
        .expect("known field");
    record
        .set_field("Learned", "Borrowed slices keep the scanner allocation-free")
        .expect("known field");
    record
}

fn period_file(entries: usize) -> String {
    let mut text = format::title_block(&PeriodKey::for_date(
        PeriodGranularity::Month,
        start().date(),
    ));
    for i in 0..entries {
        text.push_str(&format::serialize(&sample_record(
            start() + Duration::minutes(i as i64 * 37),
        )));
    }
    text
}

/// Benchmark serialization of one entry.
fn bench_serialize(c: &mut Criterion) {
    let record = sample_record(start());
    c.bench_function("serialize_entry", |b| {
        b.iter(|| black_box(format::serialize(black_box(&record))));
    });
}

/// Benchmark parsing at various file sizes.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_entries");

    for entries in [1usize, 30, 300] {
        let text = period_file(entries);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entries), &text, |b, text| {
            b.iter(|| {
                let parsed = parse_entries(black_box(text));
                black_box(parsed.entry_count());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_serialize, bench_parse);
criterion_main!(benches);
