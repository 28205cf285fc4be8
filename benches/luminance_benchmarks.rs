use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use facegate::quality::average_luminance;
use facegate::raster::{grab_frame, DEFAULT_TARGET_WIDTH};
use facegate::testing::{gray_frame, gray_source};

fn bench_average_luminance(c: &mut Criterion) {
    let mut group = c.benchmark_group("average_luminance");
    for (w, h) in [(320u32, 240u32), (320, 180), (640, 480)] {
        let frame = gray_frame(w, h, 120);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", w, h)), &frame, |b, f| {
            b.iter(|| average_luminance(black_box(f)))
        });
    }
    group.finish();
}

fn bench_grab_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("grab_frame");
    for (w, h) in [(640u32, 480u32), (1280, 720), (1920, 1080)] {
        let source = gray_source(w, h, 120);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", w, h)), &source, |b, s| {
            b.iter(|| grab_frame(black_box(s), DEFAULT_TARGET_WIDTH))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_average_luminance, bench_grab_frame);
criterion_main!(benches);
