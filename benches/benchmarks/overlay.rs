use std::f64::consts::TAU;

use criterion::{BatchSize, Criterion, criterion_group};
use rand::Rng;
use topolygon::{Geometry, GeometryFactory, coord};

const VERTICES: usize = 1000;

/// Returns a star shaped polygon around the given centre, with random radii.
fn random_star(centre: (f64, f64)) -> Geometry {
    let mut rng = rand::rng();
    let mut shell: Vec<_> = (0..VERTICES)
        .map(|i| {
            let angle = TAU * i as f64 / VERTICES as f64;
            let radius = rng.random_range(50.0..100.0);
            coord!(centre.0 + radius * angle.cos(), centre.1 + radius * angle.sin())
        })
        .collect();
    shell.push(shell[0]);

    GeometryFactory::floating().polygon(shell, vec![]).unwrap()
}

fn random_operands() -> [Geometry; 2] {
    [random_star((0., 0.)), random_star((40., 20.))]
}

pub fn large_polygons(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("large polygons");

    group.bench_function("union", |b| {
        b.iter_batched(
            random_operands,
            |[subject, clip]| subject.union(&clip),
            BatchSize::LargeInput,
        )
    });

    group.bench_function("difference", |b| {
        b.iter_batched(
            random_operands,
            |[subject, clip]| subject.difference(&clip),
            BatchSize::LargeInput,
        )
    });

    group.bench_function("intersection", |b| {
        b.iter_batched(
            random_operands,
            |[subject, clip]| subject.intersection(&clip),
            BatchSize::LargeInput,
        )
    });

    group.bench_function("buffer", |b| {
        b.iter_batched(
            || random_star((0., 0.)),
            |subject| subject.buffer(5.),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, large_polygons);
