// Criterion benchmarks for the Amora match engine

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

use amora_match::core::{MatchResolutionEngine, PairKey, PairSide};
use amora_match::models::{MatchFeature, PublicProfile};
use amora_match::services::{MemoryUserDirectory, NoopAnalytics, RecordingNotifications};
use amora_match::store::{MemoryRelationshipStore, RelationshipStore};

fn profile(id: &str) -> PublicProfile {
    PublicProfile {
        user_id: id.to_string(),
        name: format!("User {}", id),
        age: 27,
        is_verified: false,
        image_file_ids: vec![],
        description: None,
    }
}

fn bench_pair_key(c: &mut Criterion) {
    c.bench_function("pair_key_normalization", |b| {
        b.iter(|| PairKey::new(black_box("user_9f3a"), black_box("user_1c2d")))
    });
}

fn bench_store_upsert(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("memory_store_mutual_like", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = MemoryRelationshipStore::new();
                let pair = PairKey::new("1", "2").unwrap();
                store
                    .upsert_like(&pair, PairSide::Low, MatchFeature::Standard)
                    .await
                    .unwrap();
                store
                    .upsert_like(&pair, PairSide::High, MatchFeature::Standard)
                    .await
                    .unwrap()
            })
        })
    });
}

fn bench_like_flow(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("like_flow");

    for user_count in [10, 100, 1000].iter() {
        let engine = rt.block_on(async {
            let directory = Arc::new(MemoryUserDirectory::new());
            for i in 0..*user_count {
                directory.insert_profile(profile(&i.to_string())).await;
            }
            MatchResolutionEngine::new(
                Arc::new(MemoryRelationshipStore::new()),
                directory,
                Arc::new(RecordingNotifications::new()),
                Arc::new(NoopAnalytics),
            )
        });

        group.bench_with_input(
            BenchmarkId::from_parameter(user_count),
            user_count,
            |b, &count| {
                let mut i = 0usize;
                b.iter(|| {
                    let actor = (i % count).to_string();
                    let target = ((i + 1) % count).to_string();
                    i += 1;
                    rt.block_on(engine.like(&actor, &target)).unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pair_key, bench_store_upsert, bench_like_flow);
criterion_main!(benches);
