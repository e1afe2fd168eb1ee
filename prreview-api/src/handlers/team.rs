//! Team endpoints

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use prreview_core::domain::validate_required;
use prreview_core::Team;
use serde::{Deserialize, Serialize};

use crate::error::ApiErr;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: Team,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: String,
}

/// POST /team/add
pub async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiErr> {
    let Json(team) = payload?;
    let team = state.teams.create_team(team).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// GET /team/get?team_name=
pub async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiErr> {
    let Query(query) = query?;
    validate_required("team_name", &query.team_name)?;
    Ok(Json(state.teams.get_team(&query.team_name).await?))
}
