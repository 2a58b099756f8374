//! Access to the remote comment service.
//!
//! Comments are owned by another service, here they are only read and
//! attached to stories. [`CommentGateway`] is the seam used by the story
//! service, [`CommentClient`] talks HTTP/JSON to the real thing.

pub mod client;
pub mod error;

use std::{collections::HashMap, future::Future};

pub use client::CommentClient;
pub use error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CommentAuthor {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Comment {
    pub id: i64,
    pub comment: String,
    pub story_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<CommentAuthor>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<time::OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<time::OffsetDateTime>,
}

/// Comments grouped by story id
pub type CommentsByStory = HashMap<i64, Vec<Comment>>;

/// Groups comments by story, keeping order of retrieval within each story.
pub fn group_by_story(comments: impl IntoIterator<Item = Comment>) -> CommentsByStory {
    let mut grouped = CommentsByStory::new();
    for comment in comments {
        grouped.entry(comment.story_id).or_default().push(comment);
    }
    grouped
}

pub trait CommentGateway {
    fn find_by_story_id(&self, story_id: i64) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// Single remote call for all ids. Stories without comments may be absent from the map.
    fn find_by_story_ids(
        &self,
        story_ids: &[i64],
    ) -> impl Future<Output = Result<CommentsByStory>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i64, story_id: i64) -> Comment {
        Comment {
            id,
            comment: format!("comment {id}"),
            story_id,
            author: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_group_by_story() {
        let grouped = group_by_story(vec![comment(1, 10), comment(2, 20), comment(3, 10)]);
        assert_eq!(grouped.len(), 2);
        let ids: Vec<_> = grouped[&10].iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(grouped[&20].len(), 1);
    }

    #[test]
    fn test_comment_json() {
        let json = r#"{"id": 1, "comment": "Nice", "story_id": 7,
            "author": {"id": 3, "name": "Jane"}, "created_at": "2024-10-19T12:00:00Z"}"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.story_id, 7);
        assert_eq!(comment.author.unwrap().name, "Jane");
        assert_eq!(comment.created_at.unwrap().year(), 2024);
        assert!(comment.updated_at.is_none());
    }
}
