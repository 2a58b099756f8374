use std::collections::HashMap;

use crate::{ListingParams, category::CategoryRef, error::Result};
use futures::TryStreamExt as _;
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use tracing::debug;

/// Payload for both create and update, all fields are replaced on update.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct StoryInput {
    #[garde(length(chars, min = 3, max = 255))]
    pub title: String,
    #[garde(length(min = 1))]
    pub content: String,
    #[garde(length(min = 1, max = 2048))]
    pub thumbnail_url: String,
    #[garde(range(min = 1))]
    pub category_id: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct StoryRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub thumbnail_url: String,
    pub category: CategoryRef,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
    pub deleted_at: Option<time::PrimitiveDateTime>,
}

impl StoryRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// One row of the stories-categories join
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct StoryRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub thumbnail_url: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
    pub deleted_at: Option<time::PrimitiveDateTime>,
}

impl StoryRow {
    fn category(&self) -> Option<CategoryRef> {
        match (self.category_id, &self.category_name) {
            (Some(id), Some(name)) => Some(CategoryRef {
                id,
                name: name.clone(),
            }),
            _ => None,
        }
    }
}

/// Folds joined rows into stories, keeping the order in which each story
/// first appeared. Repeated rows for the same story can only fill in a
/// category that is still missing.
pub(crate) fn assemble_stories(rows: impl IntoIterator<Item = StoryRow>) -> Vec<StoryRecord> {
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut stories: Vec<StoryRecord> = Vec::new();

    for row in rows {
        let existing = positions.get(&row.id).copied();
        match existing {
            Some(pos) => {
                let story = &mut stories[pos];
                if !story.category.is_resolved() {
                    if let Some(category) = row.category() {
                        story.category = category;
                    }
                }
            }
            None => {
                let category = row.category().unwrap_or_default();
                positions.insert(row.id, stories.len());
                stories.push(StoryRecord {
                    id: row.id,
                    title: row.title,
                    content: row.content,
                    thumbnail_url: row.thumbnail_url,
                    category,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    deleted_at: row.deleted_at,
                });
            }
        }
    }

    stories
}

const SELECT_JOINED: &str = r#"
SELECT s.id, s.title, s.content, s.thumbnail_url,
c.id AS category_id, c.name AS category_name,
s.created_at, s.updated_at, s.deleted_at
FROM stories s
LEFT JOIN categories c ON s.category_id = c.id
"#;

pub type StoryRepository = StoryRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct StoryRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> StoryRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Lists stories that are not deleted, newest first.
    pub async fn find_all(&self, params: ListingParams) -> Result<Vec<StoryRecord>> {
        let sql = format!(
            "{SELECT_JOINED} WHERE s.deleted_at IS NULL ORDER BY s.created_at DESC, s.id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, StoryRow>(&sql)
            .bind(params.limit)
            .bind(params.offset)
            .fetch(&self.executor)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(assemble_stories(rows))
    }

    /// Returns story regardless of its deleted state, check [`StoryRecord::is_deleted`].
    pub async fn find_by_id(&self, id: i64) -> Result<Option<StoryRecord>> {
        let sql = format!("{SELECT_JOINED} WHERE s.id = ?");
        let rows = sqlx::query_as::<_, StoryRow>(&sql)
            .bind(id)
            .fetch_all(&self.executor)
            .await?;
        Ok(assemble_stories(rows).into_iter().next())
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM stories WHERE deleted_at IS NULL")
            .fetch_one(&self.executor)
            .await?;
        Ok(count as u64)
    }

    /// Category existence is not checked here. Returns id of the new story.
    pub async fn create(&self, payload: &StoryInput) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO stories (title, content, thumbnail_url, category_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&payload.title)
        .bind(&payload.content)
        .bind(&payload.thumbnail_url)
        .bind(payload.category_id)
        .execute(&self.executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Replaces all fields of a live story. Returns false if no such story exists
    /// or it was deleted.
    pub async fn update(&self, id: i64, payload: &StoryInput) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE stories SET title = ?, content = ?, thumbnail_url = ?, category_id = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&payload.title)
        .bind(&payload.content)
        .bind(&payload.thumbnail_url)
        .bind(payload.category_id)
        .bind(id)
        .execute(&self.executor)
        .await?;

        if result.rows_affected() == 0 {
            debug!("Story {id} not updated, missing or deleted");
        }
        Ok(result.rows_affected() > 0)
    }

    /// Soft delete. Returns false if story does not exist or is already deleted.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE stories SET deleted_at = CURRENT_TIMESTAMP WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> time::PrimitiveDateTime {
        time::PrimitiveDateTime::new(
            time::Date::from_calendar_date(2024, time::Month::October, 19).unwrap(),
            time::Time::MIDNIGHT,
        )
    }

    fn row(id: i64, category: Option<(i64, &str)>) -> StoryRow {
        StoryRow {
            id,
            title: format!("Story {id}"),
            content: "content".into(),
            thumbnail_url: "http://x".into(),
            category_id: category.map(|c| c.0),
            category_name: category.map(|c| c.1.to_string()),
            created_at: ts(),
            updated_at: ts(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_assemble_dedups_and_keeps_order() {
        let rows = vec![
            row(3, None),
            row(1, Some((1, "Fiction"))),
            row(3, Some((2, "Poetry"))),
            row(1, Some((5, "Other"))),
            row(2, None),
        ];
        let stories = assemble_stories(rows);
        let ids: Vec<_> = stories.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(stories[0].category.name, "Poetry");
        assert_eq!(stories[1].category.name, "Fiction");
        assert_eq!(stories[2].category, CategoryRef::default());
    }

    #[test]
    fn test_story_input_validation() {
        let mut input = StoryInput {
            title: "Ab".into(),
            content: "x".into(),
            thumbnail_url: "http://x".into(),
            category_id: 1,
        };
        assert!(input.validate().is_err());
        input.title = "Abc".into();
        assert!(input.validate().is_ok());
        input.title = "č".repeat(255);
        assert!(input.validate().is_ok());
        input.title = "a".repeat(256);
        assert!(input.validate().is_err());

        let missing: StoryInput = serde_json::from_str(r#"{"title": "Abc"}"#).unwrap();
        let report = missing.validate().unwrap_err();
        assert_eq!(report.iter().count(), 3);
    }
}
