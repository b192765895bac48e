use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dendro_ids::NodeId;

fn bench_from_parts(c: &mut Criterion) {
    c.bench_function("node_id_from_parts", |b| {
        b.iter(|| {
            NodeId::from_parts(black_box(["avl", "42", "17"]));
        });
    });

    c.bench_function("node_id_from_parts_sequence", |b| {
        b.iter(|| {
            for seq in 0u32..100 {
                NodeId::from_parts(black_box(["avl", "42", &seq.to_string()]));
            }
        });
    });
}

criterion_group!(benches, bench_from_parts);
criterion_main!(benches);
