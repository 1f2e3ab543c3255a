use criterion::{black_box, criterion_group, criterion_main, Criterion};

use common::position::Position;
use common::shapes::Rectangle;
use quadtree::quadtree::QuadTree;
use rand::prelude::*;

fn insert_benchmark(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut quadtree: QuadTree<u32> = QuadTree::new(Rectangle::new(0.0, 0.0, 1000.0, 1000.0));

    c.bench_function("quadtree_insert", |b| {
        b.iter(|| {
            let pos = Position::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0));
            quadtree.insert(black_box(rng.gen()), pos);
        })
    });
}

fn query_rect_benchmark(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut quadtree: QuadTree<u32> = QuadTree::new(Rectangle::new(0.0, 0.0, 1000.0, 1000.0));
    for id in 0..10_000u32 {
        let pos = Position::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0));
        quadtree.insert(id, pos);
    }

    let mut out = Vec::with_capacity(1024);
    c.bench_function("quadtree_query_rect", |b| {
        b.iter(|| {
            out.clear();
            let range = Rectangle::new(
                rng.gen_range(0.0..900.0),
                rng.gen_range(0.0..900.0),
                100.0,
                100.0,
            );
            quadtree.query_rect(black_box(&range), &mut out);
        })
    });
}

fn query_nearest_benchmark(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut quadtree: QuadTree<u32> = QuadTree::new(Rectangle::new(0.0, 0.0, 1000.0, 1000.0));
    for id in 0..10_000u32 {
        let pos = Position::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0));
        quadtree.insert(id, pos);
    }

    c.bench_function("quadtree_query_nearest", |b| {
        b.iter(|| {
            let probe = Position::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0));
            quadtree.query_nearest(black_box(probe), 1000.0)
        })
    });
}

fn update_benchmark(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut quadtree: QuadTree<u32> = QuadTree::new(Rectangle::new(0.0, 0.0, 1000.0, 1000.0));
    for id in 0..10_000u32 {
        let pos = Position::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0));
        quadtree.insert(id, pos);
    }

    c.bench_function("quadtree_update", |b| {
        b.iter(|| {
            let id = rng.gen_range(0..10_000u32);
            let pos = Position::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0));
            quadtree.update(black_box(id), pos)
        })
    });
}

criterion_group!(
    benches,
    insert_benchmark,
    query_rect_benchmark,
    query_nearest_benchmark,
    update_benchmark
);
criterion_main!(benches);
