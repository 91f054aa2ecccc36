use burn_severity::processing::classify::Classifier;
use burn_severity::processing::difference;
use burn_severity::processing::indices::{IndexCalculator, NBR};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gdal::raster::Buffer;

fn synthetic_band(size: (usize, usize), base: f32, spread: usize) -> Buffer<f32> {
    let data = (0..size.0 * size.1)
        .map(|i| base + (i % spread) as f32 / 1000.0)
        .collect();
    Buffer::new(size, data)
}

/// Benchmark the NBR kernel in isolation
fn benchmark_nbr_calculation(c: &mut Criterion) {
    let size = (1024, 1024);
    let nir = synthetic_band(size, 0.30, 100);
    let swir = synthetic_band(size, 0.15, 50);
    let nbr = NBR::new(0, 1, None);

    c.bench_function("nbr_core_calculation", |b| {
        b.iter(|| nbr.calculate(black_box(&[&nir, &swir])).unwrap())
    });
}

/// Benchmark dNBR and classification on precomputed NBR grids
fn benchmark_dnbr_classification(c: &mut Criterion) {
    let size = (1024, 1024);
    let pre = synthetic_band(size, 0.40, 300);
    let post = synthetic_band(size, -0.10, 700);
    let classifier = Classifier::dnbr();

    c.bench_function("dnbr_classification", |b| {
        b.iter(|| {
            let delta = difference(black_box(&pre), black_box(&post)).unwrap();
            classifier.classify(&delta)
        })
    });
}

criterion_group!(benches, benchmark_nbr_calculation, benchmark_dnbr_classification);
criterion_main!(benches);
