use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use reqwest::{Client, Response};
use serde_json::json;
use tracing::{error, info};

use models::Post;
use server::errors::ErrorBody;
use server::routes::posts::PostResponse;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

fn print_post(post: &Post) {
    println!("  ID:               {}", post.id);
    println!("  Title:            {}", post.title);
    println!("  Content:          {}", post.content);
    println!("  Author:           {}", post.author);
    println!("  Publication Date: {}", post.publication_date.to_rfc3339());
    println!("  Tags:             {}", post.tags.join(", "));
    println!("  Updated At:       {}", post.updated_at.to_rfc3339());
}

/// Decode the success envelope, or turn the error body into an `anyhow` error.
async fn read_envelope(step: &str, res: Response) -> Result<PostResponse> {
    let status = res.status();
    if status.is_success() {
        return res.json::<PostResponse>().await.with_context(|| format!("{step}: decoding response"));
    }
    match res.json::<ErrorBody>().await {
        Ok(body) => Err(anyhow!("{step} failed ({status}): {} [{}]", body.message, body.code)),
        Err(_) => Err(anyhow!("{step} failed ({status})")),
    }
}

fn require_post(step: &str, envelope: PostResponse) -> Result<Post> {
    envelope.post.ok_or_else(|| anyhow!("{step}: response carried no post"))
}

async fn run_scenario(client: &Client, base: &str) -> Result<()> {
    let posts_url = format!("{base}/v1/posts");

    println!("Creating post...");
    let res = client
        .post(&posts_url)
        .json(&json!({
            "title": "My First Blog Post",
            "content": "This is the content of my first blog post.",
            "author": "Aman Pandae",
            "tags": ["trending", "topic", "cloud"]
        }))
        .send()
        .await?;
    let envelope = read_envelope("create", res).await?;
    println!("{}", envelope.message);
    let created = require_post("create", envelope)?;
    print_post(&created);
    let post_url = format!("{posts_url}/{}", created.id);

    println!("Reading post...");
    let envelope = read_envelope("get", client.get(&post_url).send().await?).await?;
    println!("{}", envelope.message);
    print_post(&require_post("get", envelope)?);

    println!("Updating post...");
    let res = client
        .patch(&post_url)
        .json(&json!({"title": "Updated Title", "tags": ["news"]}))
        .send()
        .await?;
    let envelope = read_envelope("update", res).await?;
    println!("{}", envelope.message);
    print_post(&require_post("update", envelope)?);

    println!("Deleting post...");
    let envelope = read_envelope("delete", client.delete(&post_url).send().await?).await?;
    println!("{}", envelope.message);

    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_default();

    let base = std::env::var("BLOG_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
    let base = base.trim_end_matches('/').to_string();

    let client = match Client::builder().timeout(Duration::from_secs(10)).build() {
        Ok(c) => c,
        Err(e) => {
            error!(event = "client_build_failed", error = %e, "failed to build http client");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(server = %base, "running blog post scenario");
    match run_scenario(&client, &base).await {
        Ok(()) => {
            info!("scenario completed");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "scenario failed");
            std::process::ExitCode::FAILURE
        }
    }
}
