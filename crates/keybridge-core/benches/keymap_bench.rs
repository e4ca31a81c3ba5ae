//! Criterion benchmarks for keyboard layout lookups.
//!
//! Every pasted character goes through `needs_shift` and `key_code_for`, so
//! a large paste is a tight loop over these two lookups.
//!
//! Run with:
//! ```bash
//! cargo bench --package keybridge-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keybridge_core::keymap::{is_modifier_key, KeyboardLayout};

/// Representative paste payloads: prose, code, and shifted-symbol heavy text.
const BENCH_TEXTS: &[(&str, &str)] = &[
    ("prose", "The quick brown fox jumps over the lazy dog.\n"),
    ("code", "fn main() { println!(\"{}\", 1 + 2); }\n"),
    ("symbols", "~!@#$%^&*()_+{}|:\"<>?~!@#$%^&*()_+{}|:\"<>?"),
    ("unicode", "naïve café – résumé ✓"),
];

fn bench_needs_shift(c: &mut Criterion) {
    let layout = KeyboardLayout::us_qwerty();
    let mut group = c.benchmark_group("needs_shift");
    for (name, text) in BENCH_TEXTS {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, text| {
            b.iter(|| {
                text.chars()
                    .filter(|&ch| layout.needs_shift(black_box(ch)))
                    .count()
            })
        });
    }
    group.finish();
}

fn bench_key_code_for(c: &mut Criterion) {
    let layout = KeyboardLayout::us_qwerty();
    let mut group = c.benchmark_group("key_code_for");
    for (name, text) in BENCH_TEXTS {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, text| {
            b.iter(|| {
                text.chars()
                    .filter_map(|ch| layout.key_code_for(black_box(ch)))
                    .sum::<u32>()
            })
        });
    }
    group.finish();
}

fn bench_is_modifier_key(c: &mut Criterion) {
    c.bench_function("is_modifier_key/0..256", |b| {
        b.iter(|| (0u32..256).filter(|&k| is_modifier_key(black_box(k))).count())
    });
}

criterion_group!(
    benches,
    bench_needs_shift,
    bench_key_code_for,
    bench_is_modifier_key
);
criterion_main!(benches);
