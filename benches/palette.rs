#[path = "../util/util.rs"]
mod util;

use util::images;

use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use domcol::{BucketBits, Histogram, PalettePipeline, PaletteSize, PixelBuffer};

fn bench(
    c: &mut Criterion,
    group: &str,
    mut f: impl FnMut(&mut Bencher<WallTime>, &(PaletteSize, &PixelBuffer)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for (k, secs) in [(5, 2), (16, 3)] {
        let k = PaletteSize::try_from(k).unwrap();
        group.measurement_time(Duration::from_secs(secs));
        for (name, buffer) in images() {
            group.bench_with_input(BenchmarkId::new(k.to_string(), name), &(k, buffer), &mut f);
        }
    }
}

fn histogram_single(c: &mut Criterion) {
    bench(c, "histogram_single", |b, &(_, buffer)| {
        b.iter(|| Histogram::build(buffer, BucketBits::DEFAULT))
    })
}

fn histogram_par(c: &mut Criterion) {
    bench(c, "histogram_par", |b, &(_, buffer)| {
        b.iter(|| Histogram::build_par(buffer, BucketBits::DEFAULT))
    })
}

fn palette_single(c: &mut Criterion) {
    let pipeline = PalettePipeline::new();
    bench(c, "palette_single", |b, &(k, buffer)| {
        b.iter(|| pipeline.palette_from_buffer(buffer, k))
    })
}

fn palette_par(c: &mut Criterion) {
    let pipeline = PalettePipeline::new();
    bench(c, "palette_par", |b, &(k, buffer)| {
        b.iter(|| pipeline.palette_from_buffer_par(buffer, k))
    })
}

criterion_group!(
    benches,
    histogram_single,
    histogram_par,
    palette_single,
    palette_par,
);
criterion_main!(benches);
