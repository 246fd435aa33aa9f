use criterion::{BatchSize, Criterion, criterion_group};
use rand::Rng;
use topolygon::{
    PrecisionModel, coord,
    noding::{IntersectionAdder, MCIndexNoder, NodedSegmentString, Noder, SnapRoundingNoder},
};

const STRINGS: usize = 200;
const VERTICES: usize = 20;

fn random_strings() -> Vec<NodedSegmentString<usize>> {
    let mut rng = rand::rng();
    (0..STRINGS)
        .map(|id| {
            let coords = (0..VERTICES)
                .map(|_| coord!(rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
                .collect();
            NodedSegmentString::new(coords, id)
        })
        .collect()
}

pub fn random_lines(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("random lines");

    group.bench_function("monotone chains", |b| {
        b.iter_batched(
            random_strings,
            |strings| MCIndexNoder::new(IntersectionAdder::default()).compute_nodes(strings),
            BatchSize::LargeInput,
        )
    });

    group.bench_function("snap rounding", |b| {
        b.iter_batched(
            random_strings,
            |strings| SnapRoundingNoder::new(PrecisionModel::fixed(1.)).compute_nodes(strings),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, random_lines);
