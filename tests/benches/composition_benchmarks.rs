//! # Composition Benchmarks
//!
//! | Case | What is measured |
//! |------|------------------|
//! | `root_write_fanout` | one root write routed to N flattened namespaces |
//! | `deep_write` | a leaf write travelling up N nested levels |
//! | `project_round_trip` | address translation over a path of N levels |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nest_core::{
    accessor, create_store, initial, namespaced, project_down_path, project_up_path, to_state,
    Address, Unit,
};
use serde_json::json;

fn bench_root_write_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("root_write_fanout");

    for units in [1usize, 8, 32] {
        let descriptors: Vec<Unit> = (0..units)
            .map(|i| {
                Unit::builder(format!("ns{}", i))
                    .flatten()
                    .build(initial(json!({"count": 0})))
                    .expect("valid unit")
            })
            .collect();
        let store = create_store(namespaced(descriptors)).expect("store");
        let mut n = 0i64;

        group.throughput(Throughput::Elements(units as u64));
        group.bench_with_input(BenchmarkId::from_parameter(units), &units, |b, &units| {
            b.iter(|| {
                n += 1;
                let update = (0..units)
                    .map(|i| (format!("ns{}_count", i), json!(n)))
                    .collect::<serde_json::Map<_, _>>();
                store.set_state(update, false);
                black_box(store.get_state().len())
            })
        });
    }

    group.finish();
}

fn bench_deep_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_write");

    for depth in [1usize, 4, 8] {
        let leaf = Unit::new("leaf", initial(json!({"v": 0}))).expect("valid unit");
        let mut path = vec![leaf.clone()];
        let mut current = leaf;
        for level in 0..depth {
            let parent = Unit::new(format!("level{}", level), namespaced([current]))
                .expect("valid unit");
            path.push(parent.clone());
            current = parent;
        }
        let store = create_store(namespaced([current])).expect("store");

        let mut acc = accessor(&store, &path[path.len() - 1]).expect("top accessor");
        for unit in path.iter().rev().skip(1) {
            acc = acc.accessor(unit).expect("child accessor");
        }
        let mut n = 0i64;

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                n += 1;
                acc.set_state(json!({ "v": n }), false);
                black_box(acc.state().len())
            })
        });
    }

    group.finish();
}

fn bench_project_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_round_trip");
    let local = to_state(json!({"a": 1, "b": [1, 2, 3], "c": {"d": true}}));

    for depth in [1usize, 4, 16] {
        let path: Vec<Address> = (0..depth)
            .map(|i| {
                if i % 2 == 0 {
                    Address::nested(format!("n{}", i))
                } else {
                    Address::flattened(format!("f{}", i), "_")
                }
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(depth), &path, |b, path| {
            b.iter(|| {
                let up = project_up_path(local.clone(), path);
                black_box(project_down_path(&up, path))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_root_write_fanout,
    bench_deep_write,
    bench_project_round_trip
);
criterion_main!(benches);
