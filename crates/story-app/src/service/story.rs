use std::{fmt::Display, future::Future, str::FromStr, time::Duration};

use garde::Validate as _;
use serde::{de, Deserialize, Deserializer, Serialize};
use story_comments::{client::DEFAULT_TIMEOUT, Comment, CommentClient, CommentGateway};
use story_dal::{
    category::CategoryRef,
    story::{StoryInput, StoryRecord, StoryRepository},
    ListingParams, Pool,
};
use tracing::{debug, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    service::CategoryService,
    state::AppState,
};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 1000;
const DEFAULT_PAGE: i64 = 1;

/// Story as presented to clients, with its comments attached.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Story {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub thumbnail_url: String,
    pub category: CategoryRef,
    pub comments: Vec<Comment>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

impl Story {
    fn new(record: StoryRecord, comments: Vec<Comment>) -> Self {
        Story {
            id: record.id,
            title: record.title,
            content: record.content,
            thumbnail_url: record.thumbnail_url,
            category: record.category,
            comments,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Paging of story listing. Missing or non-positive values fall back to defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

/// `?limit=` is treated as if limit was not given at all
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

impl ListFilter {
    pub fn new(limit: i64, page: i64) -> Self {
        ListFilter {
            limit: Some(limit),
            page: Some(page),
        }
    }

    pub fn listing_params(&self, default_limit: i64) -> ListingParams {
        let limit = match self.limit {
            Some(limit) if limit > 0 => limit.min(MAX_PAGE_SIZE),
            _ => default_limit,
        };
        let page = match self.page {
            Some(page) if page > 0 => page,
            _ => DEFAULT_PAGE,
        };
        ListingParams::from_page(page, limit)
    }
}

pub type StoryService = StoryServiceImpl<CommentClient>;

pub struct StoryServiceImpl<G> {
    stories: StoryRepository,
    categories: CategoryService,
    comments: G,
    comment_timeout: Duration,
    default_limit: i64,
}

impl StoryService {
    pub fn from_state(state: &AppState) -> Self {
        let config = state.config();
        StoryServiceImpl::new(state.pool().clone(), state.comments().clone())
            .with_comment_timeout(config.comment_timeout)
            .with_default_limit(config.default_page_size as i64)
    }
}

impl<G: CommentGateway> StoryServiceImpl<G> {
    pub fn new(pool: Pool, comments: G) -> Self {
        StoryServiceImpl {
            stories: StoryRepository::new(pool.clone()),
            categories: CategoryService::new(pool),
            comments,
            comment_timeout: DEFAULT_TIMEOUT,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_comment_timeout(mut self, timeout: Duration) -> Self {
        self.comment_timeout = timeout;
        self
    }

    pub fn with_default_limit(mut self, limit: i64) -> Self {
        if limit > 0 {
            self.default_limit = limit.min(MAX_PAGE_SIZE);
        }
        self
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = story_comments::Result<T>>,
    ) -> story_comments::Result<T> {
        tokio::time::timeout(self.comment_timeout, call)
            .await
            .unwrap_or_else(|_| Err(story_comments::Error::Timeout(self.comment_timeout)))
    }

    /// Live stories newest first. Comments are fetched in one batch, if that fails
    /// stories are returned with empty comments.
    pub async fn list(&self, filter: ListFilter) -> ApiResult<Vec<Story>> {
        let params = filter.listing_params(self.default_limit);
        let records = self.stories.find_all(params).await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = records.iter().map(|s| s.id).collect();
        let mut comments = self
            .bounded(self.comments.find_by_story_ids(&ids))
            .await
            .unwrap_or_else(|e| {
                warn!("Listing {} stories without comments: {e}", ids.len());
                Default::default()
            });

        Ok(records
            .into_iter()
            .map(|record| {
                let story_comments = comments.remove(&record.id).unwrap_or_default();
                Story::new(record, story_comments)
            })
            .collect())
    }

    /// Deleted stories are reported as not found. Story and its comments are
    /// loaded concurrently, pending comment call is dropped when story is not found.
    pub async fn get(&self, id: i64) -> ApiResult<Story> {
        let comments = async {
            Ok::<_, ApiError>(self.bounded(self.comments.find_by_story_id(id)).await)
        };
        let (record, comments) = tokio::try_join!(self.find_live(id), comments)?;
        let comments = comments.unwrap_or_else(|e| {
            warn!(story_id = id, "Returning story without comments: {e}");
            Vec::new()
        });
        Ok(Story::new(record, comments))
    }

    pub async fn create(&self, payload: StoryInput) -> ApiResult<Story> {
        payload.validate()?;
        self.ensure_category(payload.category_id).await?;
        let id = self.stories.create(&payload).await?;
        info!(id, "Created story");
        let record = self
            .stories
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("story"))?;
        Ok(Story::new(record, Vec::new()))
    }

    /// Replaces all fields. Missing or deleted story is silently ignored.
    pub async fn update(&self, id: i64, payload: StoryInput) -> ApiResult<()> {
        payload.validate()?;
        self.ensure_category(payload.category_id).await?;
        if self.stories.update(id, &payload).await? {
            info!(id, "Updated story");
        }
        Ok(())
    }

    /// Soft delete, idempotent.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        if !self.stories.delete(id).await? {
            debug!(id, "Story already deleted or missing");
        }
        Ok(())
    }

    async fn find_live(&self, id: i64) -> ApiResult<StoryRecord> {
        self.stories
            .find_by_id(id)
            .await?
            .filter(|s| !s.is_deleted())
            .ok_or(ApiError::NotFound("story"))
    }

    async fn ensure_category(&self, category_id: i64) -> ApiResult<()> {
        if self.categories.exists(category_id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("category"))
        }
    }
}
