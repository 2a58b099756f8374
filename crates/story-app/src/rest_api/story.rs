use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use http::StatusCode;
use story_dal::story::StoryInput;

#[cfg(feature = "openapi")]
use crate::service::Story;
use crate::{
    error::{ApiError, ApiResult},
    publish_api_docs,
    rest_api::Envelope,
    service::{ListFilter, StoryService},
    state::AppState,
};

publish_api_docs!(list, get_one, create, update, delete);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "", tag = "Story", operation_id = "listStories",
    params(ListFilter),
    responses((status = StatusCode::OK, description = "Live stories, newest first", body = Envelope<Vec<Story>>))))]
pub async fn list(
    service: StoryService,
    WithRejection(Query(filter), _): WithRejection<Query<ListFilter>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let stories = service.list(filter).await?;
    Ok((StatusCode::OK, Json(Envelope::success(stories))))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/{id}", tag = "Story", operation_id = "getStory",
    params(("id" = i64, Path, description = "Story id")),
    responses((status = StatusCode::OK, description = "Story with its comments", body = Envelope<Story>),
        (status = StatusCode::NOT_FOUND, description = "Story does not exist or was deleted"))))]
pub async fn get_one(
    service: StoryService,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let story = service.get(id).await?;
    Ok((StatusCode::OK, Json(Envelope::success(story))))
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "", tag = "Story", operation_id = "createStory",
    request_body = StoryInput,
    responses((status = StatusCode::CREATED, description = "Created story", body = Envelope<Story>),
        (status = StatusCode::NOT_FOUND, description = "Category does not exist"),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid story"))))]
pub async fn create(
    service: StoryService,
    WithRejection(Json(payload), _): WithRejection<Json<StoryInput>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let story = service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(story).with_message("Story created")),
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(put, path = "/{id}", tag = "Story", operation_id = "updateStory",
    params(("id" = i64, Path, description = "Story id")),
    request_body = StoryInput,
    responses((status = StatusCode::OK, description = "Story updated, missing or deleted story is ignored"),
        (status = StatusCode::NOT_FOUND, description = "Category does not exist"),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid story"))))]
pub async fn update(
    service: StoryService,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<StoryInput>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(Envelope::<()>::message("Story updated"))))
}

#[cfg_attr(feature = "openapi", utoipa::path(delete, path = "/{id}", tag = "Story", operation_id = "deleteStory",
    params(("id" = i64, Path, description = "Story id")),
    responses((status = StatusCode::OK, description = "Story deleted, repeated delete is ignored"))))]
pub async fn delete(
    service: StoryService,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok((StatusCode::OK, Json(Envelope::<()>::message("Story deleted"))))
}
