use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Map, Value};

use jsonquery::{CacheOptions, QueryCache};

const ANCESTOR_QUERY: &str = "/AAA/BBB/DDD/CCC/EEE/ancestor::*";

fn make_catalog(rows: usize) -> Value {
    let items: Vec<Value> = (0..rows)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("item-{i}"),
                "price": (i % 50) as f64 + 0.99,
                "tags": ["a", "b", "c"],
            })
        })
        .collect();
    let mut root = Map::new();
    root.insert("items".to_string(), Value::Array(items));
    Value::Object(root)
}

fn criterion_config() -> Criterion {
    if std::env::var("JSONQUERY_BENCH_MINIMAL").is_ok() {
        Criterion::default()
            .warm_up_time(Duration::from_secs(0))
            .measurement_time(Duration::from_millis(10))
            .sample_size(1)
            .nresamples(1)
    } else {
        Criterion::default()
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let cached = QueryCache::new();
    let bypass = QueryCache::with_options(&CacheOptions::new().with_disabled(true));

    let mut compile = c.benchmark_group("compile");
    compile.bench_function("cached", |b| {
        b.iter(|| black_box(cached.compile(black_box(ANCESTOR_QUERY)).unwrap()))
    });
    compile.bench_function("disabled", |b| {
        b.iter(|| black_box(bypass.compile(black_box(ANCESTOR_QUERY)).unwrap()))
    });
    compile.finish();

    let mut find = c.benchmark_group("find");
    for rows in [100, 2000] {
        let doc = jsonquery::build(&make_catalog(rows)).unwrap();
        find.bench_function(BenchmarkId::new("price_filter", rows), |b| {
            b.iter(|| black_box(cached.find(doc.root(), "//items/*[price < 10]").unwrap().len()))
        });
        find.bench_function(BenchmarkId::new("build", rows), |b| {
            let value = make_catalog(rows);
            b.iter(|| black_box(jsonquery::build(black_box(&value)).unwrap().len()))
        });
    }
    find.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = criterion_benchmark
}
criterion_main!(benches);
