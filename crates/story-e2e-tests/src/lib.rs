pub mod rest;

use std::{collections::HashMap, path::Path, sync::Arc, time::Duration};

use anyhow::{Result, anyhow};
use axum::{Json, Router, extract::Query, extract::State, http::StatusCode, response::IntoResponse};
use rand::Rng as _;
use story_comments::Comment;
use story_server::config::{Parser, ServerConfig};
use tempfile::TempDir;
use tracing::debug;
use url::Url;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(
    test_name: &str,
    base_dir: &Path,
    comment_service_url: &Url,
) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let args = &[
        "story-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--comment-service-url",
        comment_service_url.as_str(),
        "--comment-timeout",
        "500ms",
        "--default-page-size",
        "3",
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

/// Server config in fresh temporary data dir, comments are served from given URL
pub async fn prepare_env(
    test_name: &str,
    comment_service_url: &Url,
) -> Result<(ServerConfig, ConfigGuard)> {
    let base_dir = std::env::temp_dir();
    test_config(test_name, &base_dir, comment_service_url)
}

pub fn server_url(config: &ServerConfig) -> Result<Url> {
    Ok(Url::parse(&format!("http://127.0.0.1:{}/", config.port))?)
}

/// Starts server in background and waits until it is healthy
pub async fn spawn_server(args: ServerConfig) -> Result<Url> {
    let base_url = server_url(&args)?;
    tokio::spawn(async move {
        if let Err(e) = story_server::run::run(args).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    let health_url = base_url.join("health")?;
    for _ in 0..50 {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => return Ok(base_url),
            _ => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
    Err(anyhow!("Server did not start"))
}

pub fn extend_url(url: &Url, segment: impl ToString) -> Url {
    let mut url = url.clone();
    url.path_segments_mut()
        .expect("base url")
        .push(&segment.to_string());
    url
}

#[derive(Clone, Default)]
struct FakeComments {
    comments: Arc<Vec<Comment>>,
    delay: Option<Duration>,
}

async fn serve_comments(
    State(fake): State<FakeComments>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if let Some(delay) = fake.delay {
        tokio::time::sleep(delay).await;
    }
    let ids: Vec<i64> = match (params.get("story_id"), params.get("story_ids")) {
        (Some(id), _) => id.parse::<i64>().into_iter().collect(),
        (None, Some(ids)) => ids.split(',').filter_map(|id| id.parse().ok()).collect(),
        (None, None) => return (StatusCode::BAD_REQUEST, "missing story id").into_response(),
    };
    debug!("Serving comments for stories {ids:?}");
    let comments: Vec<&Comment> = fake
        .comments
        .iter()
        .filter(|c| ids.contains(&c.story_id))
        .collect();
    Json(serde_json::json!({ "comments": comments })).into_response()
}

async fn spawn_router(router: Router) -> Result<Url> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Fake comment service failed: {e}");
        }
    });
    Ok(Url::parse(&format!("http://{addr}/"))?)
}

/// Fake comment service answering with given comments
pub async fn spawn_comment_service(comments: Vec<Comment>) -> Result<Url> {
    spawn_comment_service_with_delay(comments, None).await
}

pub async fn spawn_comment_service_with_delay(
    comments: Vec<Comment>,
    delay: Option<Duration>,
) -> Result<Url> {
    let fake = FakeComments {
        comments: Arc::new(comments),
        delay,
    };
    let router = Router::new()
        .route("/v1/comments", axum::routing::get(serve_comments))
        .with_state(fake);
    spawn_router(router).await
}

/// URL where nothing listens
pub fn unreachable_comment_service() -> Result<Url> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(Url::parse(&format!("http://{addr}/"))?)
}

pub fn comment(id: i64, story_id: i64, text: &str) -> Comment {
    Comment {
        id,
        comment: text.to_string(),
        story_id,
        author: Some(story_comments::CommentAuthor {
            id: 1,
            name: "Reader".to_string(),
        }),
        created_at: None,
        updated_at: None,
    }
}
