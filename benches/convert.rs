use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rawbitmap::image_pipeline::convert_to_image;
use std::hint::black_box;

fn generate_mock_rgb_data(width: usize, height: usize, bytes_per_sample: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 3 * bytes_per_sample);
    for y in 0..height {
        for x in 0..width {
            let value = ((x + y) % 256) as u8;
            for _ in 0..3 * bytes_per_sample {
                data.push(value);
            }
        }
    }
    data
}

fn benchmark_conversion_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_by_size");

    let sizes = vec![
        (100, 100, "100x100"),
        (1000, 1000, "1000x1000"),
        (6000, 4000, "6000x4000"),
    ];

    for (width, height, label) in sizes {
        let mock_data = generate_mock_rgb_data(width, height, 1);

        group.bench_with_input(BenchmarkId::from_parameter(label), &mock_data, |b, data| {
            b.iter(|| convert_to_image(black_box(data), width, height, 8));
        });
    }

    group.finish();
}

fn benchmark_bit_depths(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_by_depth");
    let (width, height) = (1000, 1000);

    let eight = generate_mock_rgb_data(width, height, 1);
    let sixteen = generate_mock_rgb_data(width, height, 2);

    group.bench_function("8bit", |b| {
        b.iter(|| convert_to_image(black_box(&eight), width, height, 8));
    });
    group.bench_function("14bit", |b| {
        b.iter(|| convert_to_image(black_box(&sixteen), width, height, 14));
    });
    group.bench_function("16bit", |b| {
        b.iter(|| convert_to_image(black_box(&sixteen), width, height, 16));
    });

    group.finish();
}

criterion_group!(benches, benchmark_conversion_sizes, benchmark_bit_depths);
criterion_main!(benches);
