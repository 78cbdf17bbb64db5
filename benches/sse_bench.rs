//! Benchmarks for upstream stream decoding.
//!
//! Run with: cargo bench --bench sse_bench

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use futures::StreamExt;
use together_gateway::services::sse::{fragment_from_chunk, SseDecoder};
use together_gateway::services::together::decode_fragments;

fn create_sse_body(chunk_count: usize) -> Vec<u8> {
    let mut body = String::new();
    for i in 0..chunk_count {
        let chunk = serde_json::json!({
            "id": "cmpl-bench",
            "choices": [{"index": 0, "delta": {"content": format!("token{} ", i)}}]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

/// Split a body into network-sized pieces that do not respect event boundaries.
fn split_body(body: &[u8], piece: usize) -> Vec<Bytes> {
    body.chunks(piece).map(Bytes::copy_from_slice).collect()
}

fn bench_sse_decoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("sse_decoder");

    for chunk_count in [10, 100, 1000].iter() {
        let body = create_sse_body(*chunk_count);
        let pieces = split_body(&body, 64);

        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_function(format!("{}_events", chunk_count), |b| {
            b.iter(|| {
                let mut decoder = SseDecoder::new();
                let mut events = 0usize;
                for piece in &pieces {
                    events += decoder.push(black_box(piece)).len();
                }
                black_box(events);
            });
        });
    }

    group.finish();
}

fn bench_fragment_extraction(c: &mut Criterion) {
    let chunk = r#"{"id":"cmpl-bench","choices":[{"index":0,"delta":{"content":"Hello"}}]}"#;

    c.bench_function("fragment_from_chunk", |b| {
        b.iter(|| {
            black_box(fragment_from_chunk(black_box(chunk)).unwrap());
        });
    });
}

fn bench_decode_fragments(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let body = create_sse_body(500);

    c.bench_function("decode_fragments_500", |b| {
        b.iter(|| {
            let pieces: Vec<Result<Bytes, std::io::Error>> =
                split_body(&body, 256).into_iter().map(Ok).collect();
            let count = runtime.block_on(async {
                decode_fragments(futures::stream::iter(pieces))
                    .filter(|item| futures::future::ready(item.is_ok()))
                    .count()
                    .await
            });
            black_box(count);
        });
    });
}

criterion_group!(
    benches,
    bench_sse_decoder,
    bench_fragment_extraction,
    bench_decode_fragments
);
criterion_main!(benches);
