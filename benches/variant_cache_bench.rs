use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use myth_variants::{MacroIdentity, MacroRegistry, MacroSet, VariantCache, VariantLookup};

fn registry_with(count: usize) -> (MacroRegistry, Vec<MacroIdentity>) {
    let mut registry = MacroRegistry::new();
    let ids = (0..count)
        .map(|i| registry.intern(&format!("FEATURE_{i}"), None))
        .collect();
    (registry, ids)
}

fn bench_lookup(c: &mut Criterion) {
    let (_registry, ids) = registry_with(96);

    // 256 variants spread over three words.
    let sets: Vec<MacroSet> = (0..256_usize)
        .map(|n| {
            (0..8)
                .filter(|bit| n & (1 << bit) != 0)
                .map(|bit| ids[bit * 12])
                .collect()
        })
        .collect();

    let mut cache = VariantCache::new();
    for (i, set) in sets.iter().enumerate() {
        if let VariantLookup::Miss(pending) = cache.get(set) {
            pending.cache(i);
        }
    }

    let mut group = c.benchmark_group("Variant Cache");

    group.bench_function("hit (256 variants, 3 words)", |b| {
        b.iter(|| {
            let mut sum = 0;
            for set in &sets {
                if let VariantLookup::Hit(program) = cache.get(black_box(set)) {
                    sum += *program;
                }
            }
            black_box(sum);
        });
    });

    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let (_registry, ids) = registry_with(96);
    let material: MacroSet = [ids[0], ids[5], ids[40]].into_iter().collect();
    let renderer: MacroSet = [ids[2], ids[70], ids[95]].into_iter().collect();
    let mut draw = MacroSet::new();

    let mut group = c.benchmark_group("Macro Set");

    group.bench_function("union_into (scratch reuse)", |b| {
        b.iter(|| {
            MacroSet::union_into(black_box(&material), black_box(&renderer), &mut draw);
            black_box(draw.word_len());
        });
    });

    group.bench_function("toggle", |b| {
        let mut set = material.clone();
        b.iter(|| {
            set.enable(black_box(ids[64]));
            set.disable(black_box(ids[64]));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lookup, bench_compose);
criterion_main!(benches);
