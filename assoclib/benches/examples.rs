use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId};
use assoclib::config::{CacheConfig, IndexingMode};
use assoclib::io::{load_config, load_trace};
use assoclib::simulator::run;
use assoclib::util::{get_cases, testcases_path};

/// Runs every fixture trace under both indexing strategies
pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Examples");

    get_cases(&testcases_path())
        .unwrap()
        .iter()
        // Each trace and config pair appears once per mode, only bench it once per mode below
        .filter(|case| case.mode == IndexingMode::LeastSignificantBits)
        .for_each(|case| {
            let config = load_config(&case.config).unwrap();
            let trace = load_trace(&case.trace).unwrap();
            for mode in [IndexingMode::LeastSignificantBits, IndexingMode::Adaptive] {
                let config = CacheConfig { indexing: mode, ..config.clone() };
                let name = format!("{} ({})", case.trace.display(), mode.name());
                group.bench_with_input(BenchmarkId::new("Example: ", name), &(config, trace.clone()), |bench, (conf, trace)| {
                    bench.iter(|| {
                        run(conf, trace).unwrap();
                    });
                });
            }
        });
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
