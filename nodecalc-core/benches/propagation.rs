use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nodecalc_core::graph::{Graph, NodeId};

/// A chain where node i reads node i-1 by index.
fn chain(len: usize) -> (Graph, Vec<NodeId>) {
    let mut graph = Graph::new();
    let ids: Vec<NodeId> = (0..len).map(|_| graph.create_node(0.0, 0.0, "n")).collect();
    for i in 1..len {
        graph
            .set_input(ids[i], &format!("=@{} * 1.5 + 1", i - 1), false)
            .unwrap();
    }
    (graph, ids)
}

/// One root read by `width` independent children.
fn fan_out(width: usize) -> (Graph, NodeId) {
    let mut graph = Graph::new();
    let root = graph.create_node(0.0, 0.0, "root");
    for _ in 0..width {
        let child = graph.create_node(0.0, 0.0, "leaf");
        graph.set_input(child, "=sqrt(@root) + sin(@0)", false).unwrap();
    }
    (graph, root)
}

fn bench_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Propagation");

    // Chains stay under the default cycle bound.
    for len in [10usize, 50, 100] {
        let (mut graph, ids) = chain(len);
        let mut tick = 0u64;
        group.bench_with_input(BenchmarkId::new("Chain", len), &len, |b, _| {
            b.iter(|| {
                tick += 1;
                graph
                    .set_input(ids[0], black_box(&tick.to_string()), false)
                    .unwrap();
            })
        });
    }

    for width in [100usize, 1000] {
        let (mut graph, root) = fan_out(width);
        let mut tick = 0u64;
        group.bench_with_input(BenchmarkId::new("FanOut", width), &width, |b, _| {
            b.iter(|| {
                tick += 1;
                graph
                    .set_input(root, black_box(&tick.to_string()), false)
                    .unwrap();
            })
        });
    }

    group.finish();
}

fn bench_rename(c: &mut Criterion) {
    let (mut graph, root) = fan_out(1000);
    let names = ["root", "base"];
    let mut flip = 0usize;

    c.bench_function("Rename/FanOut/1000", |b| {
        b.iter(|| {
            flip ^= 1;
            graph.rename(root, black_box(names[flip])).unwrap();
        })
    });
}

criterion_group!(benches, bench_propagation, bench_rename);
criterion_main!(benches);
