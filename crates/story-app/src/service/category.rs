use garde::Validate as _;
use story_dal::{
    category::{Category, CategoryRepository, CreateCategory, UpdateCategory},
    Pool,
};
use tracing::{debug, info};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub struct CategoryService {
    repository: CategoryRepository,
}

impl CategoryService {
    pub fn new(pool: Pool) -> Self {
        CategoryService {
            repository: CategoryRepository::new(pool),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.pool().clone())
    }

    pub async fn find_all(&self) -> ApiResult<Vec<Category>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn find_by_id(&self, id: i64) -> ApiResult<Category> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("category"))
    }

    pub async fn exists(&self, id: i64) -> ApiResult<bool> {
        Ok(self.repository.exists(id).await?)
    }

    pub async fn create(&self, payload: CreateCategory) -> ApiResult<Category> {
        payload.validate()?;
        let id = self.repository.create(&payload).await?;
        info!(id, "Created category");
        self.find_by_id(id).await
    }

    pub async fn update(&self, id: i64, payload: UpdateCategory) -> ApiResult<()> {
        payload.validate()?;
        if !self.repository.update(id, &payload).await? {
            debug!(id, "Update of missing category ignored");
        }
        Ok(())
    }

    /// Hard delete, stories referring to the category are kept.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        if !self.repository.delete(id).await? {
            debug!(id, "Delete of missing category ignored");
        }
        Ok(())
    }
}
