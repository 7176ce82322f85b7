use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pmis_model::Measurement;
use pmis_rollup::{build_dashboard, summarize, DashboardFilters, RollupConfig};
use pmis_test_utils::{sample_tree, strategic_tree};

fn bench_summarize(c: &mut Criterion) {
    let layout: Vec<Vec<Measurement>> = (0..40)
        .map(|kra| {
            (0..10)
                .map(|kpi| Measurement::new(100.0, f64::from(kra * 10 + kpi) % 120.0))
                .collect()
        })
        .collect();
    let tree = strategic_tree(&layout);
    let config = RollupConfig::default();

    c.bench_function("summarize_400_kpis", |b| {
        b.iter(|| summarize(black_box(&tree), &config));
    });

    let sample = sample_tree();
    c.bench_function("dashboard_sample", |b| {
        b.iter(|| build_dashboard(black_box(&sample), DashboardFilters::new(), &config));
    });
}

criterion_group!(benches, bench_summarize);
criterion_main!(benches);
