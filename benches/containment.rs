use criterion::{criterion_group, criterion_main, Criterion};
use region_access::{
    is_accessible, load_boundaries, BoundarySource, Coordinate, LoaderConfig, UserAccess,
};

fn grid() -> Vec<Coordinate> {
    (0..40)
        .flat_map(|lat| (0..40).map(move |lng| Coordinate::new(6. + lat as f64 * 0.75, 68. + lng as f64 * 0.75)))
        .collect()
}

pub fn containment_bench(c: &mut Criterion) {
    let source = BoundarySource::File("./tests/data/india_sample.json".into());
    let set = load_boundaries(&source, &LoaderConfig::default()).unwrap();
    let access = UserAccess::regions(vec!["Kerala", "Tamilnadu", "AndamanAndNicobarIslands"]);
    let coords = grid();

    let mut group = c.benchmark_group("india_sample");
    group.bench_function("linear_scan", |b| {
        b.iter(|| {
            coords
                .iter()
                .filter(|&&coord| is_accessible(coord, &access, set.regions()))
                .count()
        })
    });
    group.bench_function("indexed", |b| {
        b.iter(|| {
            coords
                .iter()
                .filter(|&&coord| set.is_accessible(coord, &access))
                .count()
        })
    });
    group.bench_function("check_many", |b| b.iter(|| set.check_many(&coords, &access)));
    group.finish();
}

criterion_group!(benches, containment_bench);
criterion_main!(benches);
