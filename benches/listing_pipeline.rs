//! Benchmark for the search -> filter -> sort & paginate pipeline.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vitrine::domain::models::{CatalogItem, ListingQuery};
use vitrine::services::{filter_items, paginate, search_items, sort_by_recency};

fn build_items(n: usize) -> Vec<CatalogItem> {
    let categories = ["Writing", "Business", "Tools", "Marketing", "AI"];
    (0..n)
        .map(|i| {
            let when = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
            let mut item = CatalogItem::new(format!("item-{i}"), when);
            item.title = format!("Automation agent {i}");
            item.description = "Automates a recurring workflow end to end".to_string();
            item.categories = vec![categories[i % categories.len()].to_string()];
            item.normalize_categories();
            item.tags = vec!["automation".to_string(), format!("tag-{}", i % 17)];
            item.price = (i % 100) as f64;
            item.is_verified = i % 3 == 0;
            item
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let items = build_items(5_000);
    let query = ListingQuery {
        category: Some("Tools".to_string()),
        price_max: Some(50.0),
        verified: Some(true),
        ..Default::default()
    };

    c.bench_function("search_5k", |b| {
        b.iter(|| search_items(black_box(&items), black_box("automation agent")));
    });

    c.bench_function("full_pipeline_5k", |b| {
        b.iter(|| {
            let hits = search_items(black_box(&items), "automation");
            let mut filtered = filter_items(hits, black_box(&query));
            sort_by_recency(&mut filtered);
            paginate(&filtered, 20, 40)
        });
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
