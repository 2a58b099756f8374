pub mod category;
pub mod story;

pub use category::CategoryService;
pub use story::{ListFilter, Story, StoryService, StoryServiceImpl};

crate::service_from_request!(CategoryService);
crate::service_from_request!(StoryService);

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use story_comments::{group_by_story, Comment, CommentGateway, CommentsByStory, Error, Result};
    use story_dal::Pool;

    pub async fn test_pool() -> Pool {
        let pool = sqlx::pool::PoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        story_dal::migrate(&pool).await.unwrap();
        pool
    }

    #[derive(Debug, Clone, Copy, Default)]
    pub enum Behaviour {
        #[default]
        Respond,
        Fail,
        Hang,
    }

    /// In-process comment gateway with canned comments
    #[derive(Debug, Clone, Default)]
    pub struct FakeComments {
        comments: Vec<Comment>,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl FakeComments {
        pub fn new(behaviour: Behaviour) -> Self {
            FakeComments {
                behaviour,
                ..Default::default()
            }
        }

        pub fn with_comment(mut self, story_id: i64, text: &str) -> Self {
            self.comments.push(Comment {
                id: self.comments.len() as i64 + 1,
                comment: text.to_string(),
                story_id,
                author: None,
                created_at: None,
                updated_at: None,
            });
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn behave(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Respond => Ok(()),
                Behaviour::Fail => Err(Error::Status(http::StatusCode::SERVICE_UNAVAILABLE)),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(())
                }
            }
        }
    }

    impl CommentGateway for FakeComments {
        async fn find_by_story_id(&self, story_id: i64) -> Result<Vec<Comment>> {
            self.behave().await?;
            Ok(self
                .comments
                .iter()
                .filter(|c| c.story_id == story_id)
                .cloned()
                .collect())
        }

        async fn find_by_story_ids(&self, story_ids: &[i64]) -> Result<CommentsByStory> {
            self.behave().await?;
            Ok(group_by_story(
                self.comments
                    .iter()
                    .filter(|c| story_ids.contains(&c.story_id))
                    .cloned(),
            ))
        }
    }
}
