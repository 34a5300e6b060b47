//! Lock-free stack vs. mutex-guarded stack under four threads with different push/pop mixes.
//!
//! Run with: cargo bench --bench stack

use criterion::{criterion_group, criterion_main, Criterion};
use lfstack::{ConcurrentStack, MutexStack, TreiberStack};
use std::hint::black_box;
use std::thread;
use std::time::{Duration, Instant};

const THREADS: usize = 4;

/// Runs `THREADS` threads, the first `pushers` of which push `iters` values while the rest pop
/// `iters` times.
fn run_mix<S: ConcurrentStack<u64> + Sync>(pushers: usize, iters: u64) -> Duration {
    let stack = S::default();
    let start = Instant::now();

    thread::scope(|s| {
        for t in 0..THREADS {
            let stack = &stack;
            let _unused = s.spawn(move || {
                if t < pushers {
                    for i in 0..iters {
                        stack.push(i);
                    }
                } else {
                    for _ in 0..iters {
                        let _ = black_box(stack.pop());
                    }
                }
            });
        }
    });

    start.elapsed()
}

fn bench_mix(c: &mut Criterion, name: &str, pushers: usize) {
    let mut group = c.benchmark_group(name);

    group.bench_function("mutex", |b| {
        b.iter_custom(|iters| run_mix::<MutexStack<u64>>(pushers, iters))
    });
    group.bench_function("lock_free", |b| {
        b.iter_custom(|iters| run_mix::<TreiberStack<u64>>(pushers, iters))
    });

    group.finish();
}

fn in75_out25(c: &mut Criterion) {
    bench_mix(c, "in75_out25", 3);
}

fn in50_out50(c: &mut Criterion) {
    bench_mix(c, "in50_out50", 2);
}

fn in25_out75(c: &mut Criterion) {
    bench_mix(c, "in25_out75", 1);
}

criterion_group!(benches, in75_out25, in50_out50, in25_out75);
criterion_main!(benches);
