// Shared helpers for integration tests: post fixtures and an in-process
// stand-in for the PHP blog API.
#![allow(dead_code)]

use axum::Router;
use blog_front::model::PostSummary;
use blog_front::ApiConfig;
use serde_json::{json, Value};

pub fn post_json(id: u32, category: &str) -> Value {
    json!({
        "id": id.to_string(),
        "title": format!("Post number {id} from the valley"),
        "meta_description": "A short trip report",
        "image": format!("https://cdn.example.com/{id}.jpg"),
        "category_slug": category,
        "slug": format!("post-{id}"),
        "read_time": "3",
        "views": 1000 * id,
        "created_at": "2024-04-05 10:22:11",
        "username": "mir",
        "avatar": "uploads/mir.png"
    })
}

pub fn posts(ids: std::ops::Range<u32>, category: &str) -> Vec<PostSummary> {
    ids.map(|id| serde_json::from_value(post_json(id, category)).expect("fixture post"))
        .collect()
}

/// Serve `app` on an ephemeral localhost port; returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock api");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock api serve");
    });
    format!("http://{addr}")
}

pub fn config_for(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        ..ApiConfig::default()
    }
}
