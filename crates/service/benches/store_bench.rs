use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use models::{NewPost, PostPatch};
use service::storage::{InMemoryPostStore, PostStore, ShardedPostStore};

fn seed(i: usize) -> NewPost {
    NewPost {
        id: format!("post-{i}"),
        title: "Bench".into(),
        content: "Benchmark body".into(),
        author: "bench".into(),
        publication_date: None,
        tags: vec!["bench".into()],
    }
}

fn bench_store(c: &mut Criterion, name: &str, store: Arc<dyn PostStore>) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        for i in 0..1_000 {
            store.create(seed(i)).await.unwrap();
        }
    });

    c.bench_function(&format!("{name}_get"), |b| {
        b.iter(|| rt.block_on(store.get("post-500")).unwrap());
    });

    c.bench_function(&format!("{name}_update"), |b| {
        b.iter(|| {
            let patch = PostPatch { title: Some("t".into()), ..Default::default() };
            rt.block_on(store.update("post-42", patch)).unwrap()
        });
    });
}

fn bench_stores(c: &mut Criterion) {
    bench_store(c, "in_memory", Arc::new(InMemoryPostStore::new()));
    bench_store(c, "sharded", Arc::new(ShardedPostStore::new()));
}

criterion_group!(benches, bench_stores);
criterion_main!(benches);
