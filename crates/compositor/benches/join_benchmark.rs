use compositor::join_horizontally;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};

fn poster(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([120, 40, 200, 255])))
}

fn bench_join(c: &mut Criterion) {
    let posters: Vec<DynamicImage> = (0..5).map(|i| poster(300 + i * 20, 450)).collect();

    c.bench_function("join_five_posters_native_height", |b| {
        b.iter(|| join_horizontally(black_box(&posters), None).expect("within limits"))
    });

    c.bench_function("join_five_posters_scaled", |b| {
        b.iter(|| join_horizontally(black_box(&posters), Some(300)).expect("within limits"))
    });
}

criterion_group!(benches, bench_join);
criterion_main!(benches);
