use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{Comment, CommentGateway, CommentsByStory, Error, Result, group_by_story};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct CommentsResponse {
    #[serde(default)]
    comments: Vec<Comment>,
}

/// HTTP client for the comment service. Cheap to clone, clones share
/// the connection pool.
#[derive(Debug, Clone)]
pub struct CommentClient {
    comments_url: Url,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl CommentClient {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            comments_url: comments_url(base_url)?,
            http_client,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &[(&str, String)]) -> Result<Vec<Comment>> {
        let response = self
            .http_client
            .get(self.comments_url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| Error::from_request(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let body: CommentsResponse = response
            .json()
            .await
            .map_err(|e| Error::from_request(e, self.timeout))?;
        debug!("Received {} comments", body.comments.len());
        Ok(body.comments)
    }
}

/// Base URL is taken as a directory, `http://gw/api` and `http://gw/api/` are the same.
fn comments_url(base_url: &Url) -> Result<Url> {
    let mut base_url = base_url.clone();
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    Ok(base_url.join("v1/comments")?)
}

impl CommentGateway for CommentClient {
    async fn find_by_story_id(&self, story_id: i64) -> Result<Vec<Comment>> {
        self.fetch(&[("story_id", story_id.to_string())]).await
    }

    async fn find_by_story_ids(&self, story_ids: &[i64]) -> Result<CommentsByStory> {
        if story_ids.is_empty() {
            return Ok(CommentsByStory::new());
        }
        let ids = story_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let comments = self.fetch(&[("story_ids", ids)]).await?;
        Ok(group_by_story(comments))
    }
}
