//! Throughput benchmarks
//!
//! Compares the broadcast ring against a crossbeam bounded channel in
//! single-producer single-consumer bursts, and measures fan-out cost as
//! the reader count grows. The channel baseline is not broadcast-capable;
//! it bounds what a non-fan-out queue costs on the same workload.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crossbeam::channel::bounded;
use crossbeam_utils::CachePadded;
use ringcast::Ring;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;

const RING_CAPACITY: usize = 256;
const BURST_SIZES: [u64; 3] = [1, 10, 100];

/// Sentinel that tells consumer threads to exit
const STOP: i64 = i64::MIN;

fn spsc_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");

    for burst_size in BURST_SIZES {
        group.throughput(Throughput::Elements(burst_size));
        ringcast_spsc(&mut group, burst_size);
        crossbeam_spsc(&mut group, burst_size);
    }
    group.finish();
}

fn ringcast_spsc(group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>, burst_size: u64) {
    let ring = Arc::new(Ring::<i64>::new(RING_CAPACITY).unwrap());
    let mut reader = ring.create_reader().unwrap();
    let mut writer = ring.create_writer().unwrap();

    let sink = Arc::new(CachePadded::new(AtomicI64::new(-1)));
    let consumer_sink = Arc::clone(&sink);
    let consumer = thread::spawn(move || loop {
        let value = reader.read();
        if value == STOP {
            break;
        }
        consumer_sink.store(value, Ordering::Release);
    });

    let mut next_value: i64 = 0;
    group.bench_with_input(
        BenchmarkId::new("ringcast", burst_size),
        &burst_size,
        |b, &burst| {
            b.iter(|| {
                let last = next_value + burst as i64 - 1;
                for value in next_value..=last {
                    writer.write(value);
                }
                while sink.load(Ordering::Acquire) != last {
                    std::hint::spin_loop();
                }
                next_value = last + 1;
            });
        },
    );

    writer.write(STOP);
    consumer.join().expect("consumer thread panicked");
}

fn crossbeam_spsc(group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>, burst_size: u64) {
    let (sender, receiver) = bounded::<i64>(RING_CAPACITY);

    let sink = Arc::new(CachePadded::new(AtomicI64::new(-1)));
    let consumer_sink = Arc::clone(&sink);
    let consumer = thread::spawn(move || {
        while let Ok(value) = receiver.recv() {
            if value == STOP {
                break;
            }
            consumer_sink.store(value, Ordering::Release);
        }
    });

    let mut next_value: i64 = 0;
    group.bench_with_input(
        BenchmarkId::new("crossbeam-channel", burst_size),
        &burst_size,
        |b, &burst| {
            b.iter(|| {
                let last = next_value + burst as i64 - 1;
                for value in next_value..=last {
                    sender.send(value).expect("receiver hung up");
                }
                while sink.load(Ordering::Acquire) != last {
                    std::hint::spin_loop();
                }
                next_value = last + 1;
            });
        },
    );

    sender.send(STOP).expect("receiver hung up");
    consumer.join().expect("consumer thread panicked");
}

fn fan_out_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");
    const BURST: u64 = 100;
    group.throughput(Throughput::Elements(BURST));

    for reader_count in [1usize, 2, 4] {
        let ring = Arc::new(Ring::<i64>::new(RING_CAPACITY).unwrap());

        let mut sinks = Vec::new();
        let mut consumers = Vec::new();
        for _ in 0..reader_count {
            let mut reader = ring.create_reader().unwrap();
            let sink = Arc::new(CachePadded::new(AtomicI64::new(-1)));
            sinks.push(Arc::clone(&sink));
            consumers.push(thread::spawn(move || loop {
                let value = reader.read();
                if value == STOP {
                    break;
                }
                sink.store(value, Ordering::Release);
            }));
        }

        let mut writer = ring.create_writer().unwrap();
        let mut next_value: i64 = 0;
        group.bench_with_input(
            BenchmarkId::new("readers", reader_count),
            &reader_count,
            |b, _| {
                b.iter(|| {
                    let last = next_value + BURST as i64 - 1;
                    for value in next_value..=last {
                        writer.write(value);
                    }
                    for sink in &sinks {
                        while sink.load(Ordering::Acquire) != last {
                            std::hint::spin_loop();
                        }
                    }
                    next_value = last + 1;
                });
            },
        );

        writer.write(STOP);
        for consumer in consumers {
            consumer.join().expect("consumer thread panicked");
        }
    }
    group.finish();
}

criterion_group!(benches, spsc_benchmark, fan_out_benchmark);
criterion_main!(benches);
