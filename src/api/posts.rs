use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, PostDto, validation};
use crate::auth::SessionClaim;
use crate::services::{PostDraft, PostError};

const DEFAULT_LIST_LIMIT: u64 = 20;
const MAX_LIST_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
}

fn draft_from(
    title: String,
    summary: String,
    content: String,
    cover_image: Option<String>,
) -> Result<PostDraft, ApiError> {
    validation::validate_title(&title)?;
    validation::validate_summary(&summary)?;
    validation::validate_content(&content)?;
    if let Some(url) = cover_image.as_deref() {
        validation::validate_cover_image(url)?;
    }

    Ok(PostDraft {
        title,
        summary,
        content,
        cover_image,
    })
}

/// POST /posts (gated)
/// The author is always the session's account; the payload carries none.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(claim): Extension<SessionClaim>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    let draft = draft_from(
        payload.title,
        payload.summary,
        payload.content,
        payload.cover_image,
    )?;

    let post = state.post_service().create(&claim, draft).await?;

    Ok(Json(ApiResponse::success(PostDto::from(post))))
}

/// PUT /posts/{id} (gated)
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(claim): Extension<SessionClaim>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    let draft = draft_from(
        payload.title,
        payload.summary,
        payload.content,
        payload.cover_image,
    )?;

    let post = state.post_service().update(&claim, id, draft).await?;

    Ok(Json(ApiResponse::success(PostDto::from(post))))
}

/// DELETE /posts/{id} (gated)
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(claim): Extension<SessionClaim>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    state.post_service().delete(&claim, id).await?;

    Ok(Json(ApiResponse::success(true)))
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    let post = state
        .post_service()
        .get(id)
        .await?
        .ok_or(PostError::NotFound)?;

    Ok(Json(ApiResponse::success(PostDto::from(post))))
}

/// GET /posts?limit=
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<PostDto>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);

    let posts = state.post_service().list_recent(limit).await?;
    let dtos: Vec<PostDto> = posts.into_iter().map(PostDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}
