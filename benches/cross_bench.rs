//! Criterion benchmarks for exhaustive cross enumeration.
//!
//! Cost grows as 4^n with the trait count, so the sizes stay small.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mendel::prelude::*;

fn heterozygote(traits: usize) -> Genotype {
    (0..traits)
        .map(|i| {
            let base = (b'a' + i as u8) as char;
            format!("{}{}", base.to_ascii_uppercase(), base)
        })
        .collect::<Vec<_>>()
        .join(" ")
        .parse()
        .expect("generated genotype is well formed")
}

fn definitions(traits: usize) -> AlleleDefinitions {
    let mut defs = AlleleDefinitions::new();
    for i in 0..traits {
        let base = (b'a' + i as u8) as char;
        defs.define_trait(base, "dominant", "recessive")
            .expect("letters are valid symbols");
    }
    defs
}

fn bench_cross(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross");
    for traits in 1..=5 {
        let parent = heterozygote(traits);
        group.bench_with_input(BenchmarkId::from_parameter(traits), &parent, |b, parent| {
            b.iter(|| cross(black_box(parent), black_box(parent)).unwrap())
        });
    }
    group.finish();
}

fn bench_expected_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("expected_counts");
    for traits in 1..=5 {
        let parent = heterozygote(traits);
        let defs = definitions(traits);
        group.bench_with_input(BenchmarkId::from_parameter(traits), &parent, |b, parent| {
            b.iter(|| {
                let offspring = cross(parent, parent).unwrap();
                let ratios = phenotype_ratios(&offspring, &defs).unwrap();
                expected_counts(&ratios, black_box(1000)).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_chi_square(c: &mut Criterion) {
    let expected: ExpectedCounts = (0..16).map(|i| (format!("class {}", i), 62.5)).collect();
    let observed: ObservedCounts = (0..16).map(|i| (format!("class {}", i), 55 + i)).collect();
    let config = ValidatorConfig::default();
    c.bench_function("chi_square_16_classes", |b| {
        b.iter(|| chi_square_test(black_box(&expected), black_box(&observed), &config).unwrap())
    });
}

criterion_group!(benches, bench_cross, bench_expected_counts, bench_chi_square);
criterion_main!(benches);
