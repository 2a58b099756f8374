use axum::Router;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub mod category;
mod macros;
pub mod story;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Common response body. `data` is omitted when there is nothing to return,
/// `message` when there is nothing to say.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope {
            status: Status::Success,
            message: None,
            data: Some(data),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Envelope {
            status: Status::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope {
            status: Status::Error,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/v1/stories", story::router())
        .nest("/v1/categories", category::router())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_shape() {
        let empty: Vec<i64> = vec![];
        assert_eq!(
            serde_json::to_value(Envelope::success(empty)).unwrap(),
            json!({"status": "success", "data": []})
        );
        assert_eq!(
            serde_json::to_value(Envelope::<()>::error("story not found")).unwrap(),
            json!({"status": "error", "message": "story not found"})
        );
        assert_eq!(
            serde_json::to_value(Envelope::success(1).with_message("Created")).unwrap(),
            json!({"status": "success", "message": "Created", "data": 1})
        );
    }
}
