//! Pull request endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use prreview_core::domain::validate_required;
use prreview_core::PullRequest;
use serde::{Deserialize, Serialize};

use crate::error::ApiErr;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePullRequestRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MergePullRequestRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub pull_request_id: String,
    pub old_user_id: String,
}

#[derive(Debug, Serialize)]
pub struct PullRequestResponse {
    pub pr: PullRequest,
}

#[derive(Debug, Serialize)]
pub struct ReassignResponse {
    pub pr: PullRequest,
    pub replaced_by: String,
}

/// POST /pullRequest/create
pub async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ApiErr> {
    let Json(req) = payload?;
    let pr = state
        .engine
        .create_pull_request(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await?;
    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

/// POST /pullRequest/merge
pub async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ApiErr> {
    let Json(req) = payload?;
    validate_required("pull_request_id", &req.pull_request_id)?;
    let pr = state.engine.merge_pull_request(&req.pull_request_id).await?;
    Ok(Json(PullRequestResponse { pr }))
}

/// POST /pullRequest/reassign
pub async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<ReassignResponse>, ApiErr> {
    let Json(req) = payload?;
    validate_required("pull_request_id", &req.pull_request_id)?;
    validate_required("old_user_id", &req.old_user_id)?;

    let result = state
        .engine
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await?;

    Ok(Json(ReassignResponse {
        pr: result.pull_request,
        replaced_by: result.replaced_by,
    }))
}
