//! User endpoints

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use prreview_core::domain::validate_required;
use prreview_core::{PullRequestShort, User};
use serde::{Deserialize, Serialize};

use crate::error::ApiErr;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SetIsActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}

/// POST /users/setIsActive
pub async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErr> {
    let Json(req) = payload?;
    validate_required("user_id", &req.user_id)?;
    let user = state.users.set_active(&req.user_id, req.is_active).await?;
    Ok(Json(UserResponse { user }))
}

/// GET /users/getReview?user_id=
pub async fn get_reviews(
    State(state): State<AppState>,
    query: Result<Query<ReviewsQuery>, QueryRejection>,
) -> Result<Json<ReviewsResponse>, ApiErr> {
    let Query(query) = query?;
    validate_required("user_id", &query.user_id)?;
    let pull_requests = state.engine.reviews_for_user(&query.user_id).await?;
    Ok(Json(ReviewsResponse {
        user_id: query.user_id,
        pull_requests,
    }))
}
