use credit_approval::artifacts::MemorySink;
use credit_approval::config::{DataSource, PipelineConfig};
use credit_approval::preprocessing::PreprocessingConfig;
use credit_approval::runner::PipelineRunner;
use credit_approval::synthetic::CreditDataGenerator;
use credit_approval::training::{ApprovalModel, ModelConfig, StratifiedSplitter};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for n_rows in [1000, 4000, 16000].iter() {
        group.bench_with_input(BenchmarkId::new("rows", n_rows), n_rows, |b, &n| {
            b.iter(|| CreditDataGenerator::new(black_box(n)).generate().unwrap())
        });
    }

    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [1000, 4000, 16000].iter() {
        let df = CreditDataGenerator::new(*n_rows).generate().unwrap();
        let split = StratifiedSplitter::new().split(&df, "approved").unwrap();

        group.bench_with_input(BenchmarkId::new("approval_model", n_rows), &split, |b, split| {
            b.iter(|| {
                let mut model = ApprovalModel::new(PreprocessingConfig::default(), ModelConfig::default());
                model.fit(black_box(&split.x_train), &split.y_train).unwrap();
                model
            })
        });
    }

    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.sample_size(10);

    for (label, eda) in [("no_eda", false), ("with_eda", true)] {
        let config = PipelineConfig::new()
            .with_source(DataSource::Synthetic { rows: 4000 })
            .with_eda(eda);
        let runner = PipelineRunner::new(config);

        group.bench_function(label, |b| {
            b.iter(|| {
                let mut sink = MemorySink::new();
                runner.run(&mut sink).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generation, bench_fit, bench_full_run);
criterion_main!(benches);
