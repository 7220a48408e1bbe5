use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use terrarium_core::{SimConfig, Simulation};

fn bench_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.sample_size(20);

    for &(width, height) in &[(160_usize, 100_usize), (320, 200)] {
        group.bench_function(format!("{width}x{height}_10_ticks"), |b| {
            b.iter_batched(
                || {
                    let mut config = SimConfig::default();
                    config.grid.width = width;
                    config.grid.height = height;
                    Simulation::new(config, 0xBEEF).expect("valid config")
                },
                |mut sim| {
                    let report = sim.run(10).expect("ticks");
                    black_box(report);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ticks);
criterion_main!(benches);
