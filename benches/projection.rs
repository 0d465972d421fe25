//! Benchmarks for record projection
//!
//! Measures directive parsing and the recursive walk over a list of records
//! under different scope sets and export-key restrictions.
//! Run with: `cargo bench --bench projection`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scope_sieve::{sieve, Directive, Projectable};

// =============================================================================
// Benchmark Data
// =============================================================================

#[derive(Projectable)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

#[derive(Projectable)]
pub struct Record {
    pub id: u64,
    #[sieve("s:*")]
    pub title: String,
    #[sieve("s:private")]
    pub owner_email: String,
    pub created_at: u64,
    #[sieve("ef:created_at")]
    pub updated_at: u64,
    #[sieve("k:name")]
    pub tags: Vec<Tag>,
    #[sieve(name = "notes,omitempty")]
    pub notes: String,
}

fn records(count: usize) -> Vec<Record> {
    (0..count as u64)
        .map(|i| Record {
            id: i,
            title: format!("record {}", i),
            owner_email: format!("owner{}@example.com", i),
            created_at: i,
            updated_at: if i % 2 == 0 { i } else { i + 1 },
            tags: (0..4)
                .map(|t| Tag {
                    name: format!("t{}", t),
                    value: format!("v{}", t),
                })
                .collect(),
            notes: String::new(),
        })
        .collect()
}

// =============================================================================
// Directive Parsing
// =============================================================================

fn bench_directive_parse(c: &mut Criterion) {
    c.bench_function("directive_parse", |b| {
        b.iter(|| Directive::parse(black_box("s:public,private;k:name,id;ef:created_at;ev:0;e.any")))
    });
}

// =============================================================================
// Projection
// =============================================================================

fn bench_project_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_records");

    for count in [10usize, 100, 1000] {
        let data = records(count);

        group.bench_with_input(BenchmarkId::new("public", count), &data, |b, data| {
            b.iter(|| sieve(black_box(data), ["public"]).project().unwrap())
        });

        group.bench_with_input(BenchmarkId::new("private", count), &data, |b, data| {
            b.iter(|| sieve(black_box(data), ["private", "public"]).project().unwrap())
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let data = records(100);
    c.bench_function("encode_100", |b| {
        b.iter(|| sieve(black_box(&data), ["public"]).to_vec().unwrap())
    });
}

criterion_group!(benches, bench_directive_parse, bench_project_records, bench_encode);
criterion_main!(benches);
