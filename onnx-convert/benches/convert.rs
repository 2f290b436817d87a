use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use onnx_convert::{build_graph, convert_model, serialize_graph, testing::conv_net};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    for depth in [4, 16, 64] {
        let model = conv_net(depth, 16);
        group.bench_with_input(BenchmarkId::new("end-to-end", depth), &model, |b, model| {
            b.iter(|| convert_model(black_box(model)).expect("conversion failed"))
        });

        let graph = model.graph.as_ref().expect("model has a graph");
        let built = build_graph(graph).expect("conversion failed").graph;
        group.bench_with_input(BenchmarkId::new("serialize", depth), &built, |b, graph| {
            b.iter(|| serialize_graph(black_box(graph)))
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
