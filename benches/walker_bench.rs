//! Benchmarks for dirtree
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::Path;

fn build_tree(root: &Path, width: usize, depth: usize) {
    if depth == 0 {
        return;
    }
    for i in 0..width {
        let dir = root.join(format!("d{}", i));
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("file.txt"), b"payload").unwrap();
        build_tree(&dir, width, depth - 1);
    }
}

fn benchmark_walk(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path(), 6, 4);

    let mut group = c.benchmark_group("walk");
    for (threads, capacity) in [(1i64, 0i64), (1, 1024), (4, 0), (4, 1024), (8, 16)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("t{}_q{}", threads, capacity)),
            &(threads, capacity),
            |b, &(threads, capacity)| {
                b.iter(|| {
                    let root = dirtree::walk(dir.path(), threads, capacity).unwrap();
                    black_box(root.total_length())
                })
            },
        );
    }
    group.finish();
}

fn benchmark_queue_operations(c: &mut Criterion) {
    use dirtree::walker::queue::WorkQueue;

    let dir = tempfile::tempdir().unwrap();
    let node = dirtree::walk(dir.path(), 1, 0).unwrap();

    c.bench_function("queue_send_recv", |b| {
        let queue = WorkQueue::new(10000);
        let sender = queue.sender();
        let receiver = queue.receiver();

        b.iter(|| {
            sender.try_send(node.clone()).unwrap();
            let received = receiver.try_recv().unwrap();
            black_box(received);
        })
    });
}

criterion_group!(benches, benchmark_walk, benchmark_queue_operations);
criterion_main!(benches);
