use crate::error::Result;
use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;

#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct CreateCategory {
    #[garde(length(chars, min = 1, max = 255))]
    pub name: String,
}

pub type UpdateCategory = CreateCategory;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

/// Category as embedded in a story. The default value (id 0, empty name)
/// stands for a category that could not be resolved.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

impl CategoryRef {
    pub fn is_resolved(&self) -> bool {
        self.id != 0
    }
}

impl From<Category> for CategoryRef {
    fn from(value: Category) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

pub type CategoryRepository = CategoryRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct CategoryRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> CategoryRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn find_all(&self) -> Result<Vec<Category>> {
        let records = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories ORDER BY id",
        )
        .fetch(&self.executor)
        .take(crate::MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        let record = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?;
        Ok(record)
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.executor)
                .await?;
        Ok(exists)
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM categories")
            .fetch_one(&self.executor)
            .await?;
        Ok(count as u64)
    }

    /// Returns id of the new category.
    pub async fn create(&self, payload: &CreateCategory) -> Result<i64> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(&payload.name)
            .execute(&self.executor)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Returns false if there was no category with given id.
    pub async fn update(&self, id: i64, payload: &UpdateCategory) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE categories SET name = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(&payload.name)
        .bind(id)
        .execute(&self.executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
