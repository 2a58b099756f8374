use std::{sync::Arc, time::Duration};

use story_comments::CommentClient;
use story_dal::Pool;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool, comments: CommentClient) -> Self {
        AppState {
            state: Arc::new(AppStateInner {
                app_config,
                pool,
                comments,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn comments(&self) -> &CommentClient {
        &self.state.comments
    }
}

struct AppStateInner {
    pool: Pool,
    comments: CommentClient,
    app_config: AppConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Used when listing request has no valid limit
    pub default_page_size: u32,
    /// Upper bound for any call to the comment service
    pub comment_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page_size: crate::service::story::DEFAULT_LIMIT as u32,
            comment_timeout: story_comments::client::DEFAULT_TIMEOUT,
        }
    }
}
