// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::Cell;
use std::rc::Rc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_observe::{Array, HandlerGraph, HandlerId, Object, Observer, Registry, Value};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_usize(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        (self.next_u32() as usize) % upper_exclusive
    }
}

#[derive(Default)]
struct Counter(Cell<u64>);

impl Observer for Counter {
    fn on_access(&self) {}
    fn on_modify(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Handler graph with `n` nodes, each a child of `parents_per_node` earlier
/// nodes. Node 0 is an observed root.
fn build_graph(n: u32, parents_per_node: u32, seed: u64) -> (HandlerGraph, Vec<HandlerId>) {
    let mut graph = HandlerGraph::with_capacity(n as usize);
    let mut rng = Lcg::new(seed);
    let mut ids = Vec::with_capacity(n as usize);
    for i in 0..n {
        let parent = (i > 0).then(|| ids[rng.gen_range_usize(i as usize)]);
        let id = graph.create(parent, i == 0).expect("parents are live");
        for _ in 1..parents_per_node.min(i) {
            graph.add_parent(id, ids[rng.gen_range_usize(i as usize)]);
        }
        ids.push(id);
    }
    (graph, ids)
}

/// Object tree of the given depth and fanout, with array leaves.
fn build_state(depth: u32, fanout: u32) -> Object {
    let object = Object::new();
    for i in 0..fanout {
        let child: Value = if depth == 0 {
            (0..fanout).map(|j| j as i32).collect::<Array>().into()
        } else {
            build_state(depth - 1, fanout).into()
        };
        object.insert(format!("f{i}"), child);
    }
    object
}

fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_observe/graph");
    group.sample_size(50);

    for &(n, parents_per_node) in &[
        (256_u32, 1_u32),
        (256_u32, 4_u32),
        (4_096_u32, 1_u32),
        (4_096_u32, 4_u32),
    ] {
        let (graph, ids) = build_graph(n, parents_per_node, 0x0B5E_0000_0000_0001);
        group.bench_function(format!("contains_leaf(n={n},p={parents_per_node})"), |b| {
            let leaf = *ids.last().expect("non-empty graph");
            b.iter(|| black_box(graph.contains(black_box(leaf))));
        });

        let registry = Registry::new();
        let mut mirror = Vec::with_capacity(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            let parent = graph.parents(id).next().and_then(|p| {
                ids.iter().position(|&other| other == p).map(|pos| mirror[pos])
            });
            let handler = registry
                .create_handler(parent, i == 0)
                .expect("parents are live");
            mirror.push(handler);
        }
        let counter = Rc::new(Counter::default());
        let target = Value::from(Object::new());
        registry
            .install_on(&target, Some(mirror[0]))
            .expect("handler is live");
        registry.attach(&target, &counter);

        group.bench_function(format!("on_modify_leaf(n={n},p={parents_per_node})"), |b| {
            let leaf = *mirror.last().expect("non-empty graph");
            b.iter(|| registry.on_modify(black_box(leaf)));
        });
        black_box(counter.0.get());
    }

    group.finish();
}

fn bench_proxy(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_observe/proxy");
    group.sample_size(50);

    for &(depth, fanout) in &[(2_u32, 4_u32), (3_u32, 4_u32), (4_u32, 4_u32)] {
        group.bench_function(format!("proxy_deep(d={depth},f={fanout})"), |b| {
            b.iter_batched(
                || (Registry::new(), build_state(depth, fanout)),
                |(registry, state)| {
                    let tracked = registry.proxy_deep(state);
                    black_box(registry.handler_count());
                    black_box(tracked);
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("push_notify(d={depth},f={fanout})"), |b| {
            let registry = Registry::new();
            let state = build_state(depth, fanout);
            let tracked = registry.proxy_deep(state.clone());
            let counter = Rc::new(Counter::default());
            registry.attach(&tracked, &counter);

            let mut leaf = tracked;
            while let Some(object) = leaf.as_object().cloned() {
                leaf = object.get("f0");
            }
            let list = leaf.as_array().cloned().expect("array leaf");
            b.iter(|| {
                list.push(1);
                list.pop();
            });
            black_box(counter.0.get());
        });

        group.bench_function(format!("read_path(d={depth},f={fanout})"), |b| {
            let registry = Registry::new();
            let tracked = registry.proxy_deep(build_state(depth, fanout));
            b.iter(|| {
                let mut current = tracked.clone();
                while let Some(object) = current.as_object().cloned() {
                    current = object.get("f0");
                }
                black_box(current);
            });
        });
    }

    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_observe/sweep");
    group.sample_size(50);

    for &count in &[256_usize, 4_096] {
        group.bench_function(format!("sweep_dropped(n={count})"), |b| {
            b.iter_batched(
                || {
                    let registry = Registry::new();
                    let mut kept = Vec::with_capacity(count / 2);
                    let mut rng = Lcg::new(0x0B5E_0000_0000_0002);
                    for _ in 0..count {
                        let object = Object::new();
                        registry.proxy(object.clone());
                        if rng.gen_range_usize(2) == 0 {
                            kept.push(object);
                        }
                    }
                    (registry, kept)
                },
                |(registry, kept)| {
                    black_box(registry.sweep());
                    black_box(kept);
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_graph, bench_proxy, bench_sweep);
criterion_main!(benches);
