use std::net::SocketAddr;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use configs::{AppConfig, StoreBackend};
use server::errors::ErrorBody;
use server::routes::posts::PostResponse;

struct TestApp {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestApp {
    async fn stop(mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await?;
        Ok(())
    }
}

async fn start_server(backend: StoreBackend) -> anyhow::Result<TestApp> {
    let mut cfg = AppConfig::default();
    cfg.store.backend = backend;
    let app = server::startup::build_app(&cfg)?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let shutdown = async {
            let _ = rx.await;
        };
        if let Err(e) = server::serve(listener, app, shutdown).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url, shutdown: Some(tx), handle })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server(StoreBackend::Memory).await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    app.stop().await
}

async fn blog_post_lifecycle(backend: StoreBackend) -> anyhow::Result<()> {
    let app = start_server(backend).await?;
    let c = reqwest::Client::new();
    let posts_url = format!("{}/v1/posts", app.base_url);

    // Create
    let res = c
        .post(&posts_url)
        .json(&json!({
            "title": "My First Blog Post",
            "content": "This is the content of my first blog post.",
            "author": "Aman Pandae",
            "tags": ["trending", "topic", "cloud"]
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<PostResponse>().await?.post.ok_or_else(|| anyhow::anyhow!("no post"))?;
    assert!(!created.id.is_empty());
    let post_url = format!("{}/{}", posts_url, created.id);

    // Get
    let res = c.get(&post_url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let fetched = res.json::<PostResponse>().await?;
    assert_eq!(fetched.message, "Post retrieved successfully");
    assert_eq!(fetched.post.as_ref(), Some(&created));

    // Update
    let res = c
        .patch(&post_url)
        .json(&json!({"title": "Updated Title", "tags": ["news"]}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = c.get(&post_url).send().await?;
    let updated = res.json::<PostResponse>().await?.post.ok_or_else(|| anyhow::anyhow!("no post"))?;
    assert_eq!(updated.title, "Updated Title");
    assert_eq!(updated.tags, vec!["news"]);
    assert_eq!(updated.content, created.content);
    assert_eq!(updated.author, "Aman Pandae");
    assert_eq!(updated.publication_date, created.publication_date);
    assert!(updated.updated_at > created.updated_at);

    // Delete
    let res = c.delete(&post_url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.json::<PostResponse>().await?.success);

    let res = c.get(&post_url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let err = res.json::<ErrorBody>().await?;
    assert!(!err.success);
    assert_eq!(err.message, format!("post not found: {}", created.id));

    app.stop().await
}

#[tokio::test]
async fn e2e_lifecycle_in_memory() -> anyhow::Result<()> {
    blog_post_lifecycle(StoreBackend::Memory).await
}

#[tokio::test]
async fn e2e_lifecycle_sharded() -> anyhow::Result<()> {
    blog_post_lifecycle(StoreBackend::Sharded).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn e2e_concurrent_creates_get_distinct_ids() -> anyhow::Result<()> {
    let app = start_server(StoreBackend::Sharded).await?;
    let c = reqwest::Client::new();
    let mut tasks = Vec::new();
    for i in 0..16 {
        let c = c.clone();
        let url = format!("{}/v1/posts", app.base_url);
        tasks.push(tokio::spawn(async move {
            let res = c
                .post(url)
                .json(&json!({"title": format!("post {i}"), "content": "body", "author": "load"}))
                .send()
                .await?;
            let body = res.json::<PostResponse>().await?;
            anyhow::Ok(body.post.map(|p| p.id))
        }));
    }
    let mut ids = std::collections::HashSet::new();
    for t in tasks {
        if let Some(id) = t.await?? {
            ids.insert(id);
        }
    }
    assert_eq!(ids.len(), 16);

    let stats = reqwest::get(format!("{}/stats", app.base_url)).await?.json::<serde_json::Value>().await?;
    assert_eq!(stats["posts"], 16);
    app.stop().await
}
