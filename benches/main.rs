// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

use criterion::{criterion_group, criterion_main, Criterion};
use gmxbb::prelude::*;

fn benchmark(c: &mut Criterion) {
    let reference: Vec<usize> = (1..=50_000).collect();
    let restrain: Vec<usize> = reference.iter().copied().filter(|x| x % 3 != 0).collect();
    let force_constants: ForceConstants = "500 500 500".parse().unwrap();

    c.bench_function("PositionRestraints::map (50000 atoms)", |b| {
        b.iter(|| {
            std::hint::black_box(
                PositionRestraints::map(&reference, &restrain, force_constants.clone()).unwrap(),
            );
        })
    });

    c.bench_function("IndexFile::from_ndx", |b| {
        b.iter(|| {
            std::hint::black_box(IndexFile::from_ndx("test_files/ndx2resttop.ndx").unwrap());
        })
    });

    let text = std::fs::read_to_string("test_files/topology_chains/topol.top").unwrap();

    c.bench_function("Topology::from_text", |b| {
        b.iter(|| {
            std::hint::black_box(Topology::from_text(&text));
        })
    });

    c.bench_function("Topology::add_molecule", |b| {
        b.iter(|| {
            let mut topology = Topology::from_text(&text);
            topology.add_molecule("LIG", 1);
            std::hint::black_box(topology.to_text());
        })
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
