use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dendro_avl::AvlTree;
use dendro_layout::BinaryLayoutConfig;
use dendro_testkit::shuffled_keys;

fn bench_insert(c: &mut Criterion) {
    let keys = shuffled_keys(1000, 42);

    c.bench_function("avl_insert_1000_shuffled", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for &key in &keys {
                tree.insert(black_box(key));
            }
            tree
        });
    });

    c.bench_function("avl_layout_1000", |b| {
        let mut tree = AvlTree::new();
        for &key in &keys {
            tree.insert(key);
        }
        let config = BinaryLayoutConfig::avl();
        b.iter(|| {
            tree.calculate_coordinates(black_box(&config));
        });
    });
}

criterion_group!(benches, bench_insert);
criterion_main!(benches);
