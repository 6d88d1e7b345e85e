//! Benchmarks for the streaming GZIP reader and writer.
//!
//! - Compression throughput per level
//! - Decompression throughput per data pattern
//! - Cost of small read buffers and multi-member streams

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxigz_gzip::{GzipReader, compress, decompress};
use std::hint::black_box;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    /// Random data - no patterns (worst compression)
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Text-like data
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump! ";
        text.iter().copied().cycle().take(size).collect()
    }

    /// Uniform data - all bytes are the same
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }
}

const SIZE: usize = 1024 * 1024;

fn bench_compress_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip_compress_levels");
    let data = test_data::text_like(SIZE);
    group.throughput(Throughput::Bytes(SIZE as u64));

    for level in [0u8, 1, 6, 9] {
        group.bench_with_input(BenchmarkId::from_parameter(level), &data, |b, data| {
            b.iter(|| compress(black_box(data), level))
        });
    }

    group.finish();
}

fn bench_decompress_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip_decompress_patterns");
    let patterns: [(&str, PatternGenerator); 3] = [
        ("random", test_data::random),
        ("text_like", test_data::text_like),
        ("uniform", test_data::uniform),
    ];

    for (name, generate) in patterns {
        let compressed = compress(&generate(SIZE), 6).unwrap();
        group.throughput(Throughput::Bytes(SIZE as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &compressed, |b, data| {
            b.iter(|| decompress(black_box(&data[..])))
        });
    }

    group.finish();
}

fn bench_read_buffer_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip_read_buffer_sizes");
    let compressed = compress(&test_data::text_like(SIZE), 6).unwrap();
    group.throughput(Throughput::Bytes(SIZE as u64));

    for buffer in [64usize, 4096, 65536] {
        group.bench_with_input(BenchmarkId::from_parameter(buffer), &compressed, |b, data| {
            b.iter(|| {
                let mut reader = GzipReader::new(&data[..]);
                let mut buf = vec![0u8; buffer];
                let mut total = 0;
                loop {
                    let n = reader.read_data(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    total += n;
                }
                black_box(total)
            })
        });
    }

    group.finish();
}

fn bench_multi_member(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip_multi_member");
    let data = test_data::text_like(SIZE);

    for members in [1usize, 16, 256] {
        let mut stream = Vec::new();
        for chunk in data.chunks(SIZE / members) {
            stream.extend(compress(chunk, 6).unwrap());
        }
        group.throughput(Throughput::Bytes(SIZE as u64));
        group.bench_with_input(BenchmarkId::from_parameter(members), &stream, |b, stream| {
            b.iter(|| decompress(black_box(&stream[..])))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compress_levels,
    bench_decompress_patterns,
    bench_read_buffer_sizes,
    bench_multi_member
);
criterion_main!(benches);
