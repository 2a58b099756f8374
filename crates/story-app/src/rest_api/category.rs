use axum::{extract::Path, response::IntoResponse, routing::get, Json, Router};
use axum_extra::extract::WithRejection;
use http::StatusCode;
#[cfg(feature = "openapi")]
use story_dal::category::Category;
use story_dal::category::{CreateCategory, UpdateCategory};

use crate::{
    error::{ApiError, ApiResult},
    publish_api_docs,
    rest_api::Envelope,
    service::CategoryService,
    state::AppState,
};

publish_api_docs!(list, get_one, create, update, delete);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "", tag = "Category", operation_id = "listCategories",
    responses((status = StatusCode::OK, description = "All categories ordered by id", body = Envelope<Vec<Category>>))))]
pub async fn list(service: CategoryService) -> ApiResult<impl IntoResponse> {
    let categories = service.find_all().await?;
    Ok((StatusCode::OK, Json(Envelope::success(categories))))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/{id}", tag = "Category", operation_id = "getCategory",
    params(("id" = i64, Path, description = "Category id")),
    responses((status = StatusCode::OK, description = "Category", body = Envelope<Category>),
        (status = StatusCode::NOT_FOUND, description = "Category does not exist"))))]
pub async fn get_one(
    service: CategoryService,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let category = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(Envelope::success(category))))
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "", tag = "Category", operation_id = "createCategory",
    request_body = CreateCategory,
    responses((status = StatusCode::CREATED, description = "Created category", body = Envelope<Category>),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid category"))))]
pub async fn create(
    service: CategoryService,
    WithRejection(Json(payload), _): WithRejection<Json<CreateCategory>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let category = service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(category).with_message("Category created")),
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(put, path = "/{id}", tag = "Category", operation_id = "updateCategory",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategory,
    responses((status = StatusCode::OK, description = "Category updated, missing category is ignored"),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid category"))))]
pub async fn update(
    service: CategoryService,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateCategory>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(Envelope::<()>::message("Category updated"))))
}

#[cfg_attr(feature = "openapi", utoipa::path(delete, path = "/{id}", tag = "Category", operation_id = "deleteCategory",
    params(("id" = i64, Path, description = "Category id")),
    responses((status = StatusCode::OK, description = "Category deleted, stories keep their category id"))))]
pub async fn delete(
    service: CategoryService,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok((StatusCode::OK, Json(Envelope::<()>::message("Category deleted"))))
}
