//! Axum route handlers for the Opportunities API.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::matcher::{MatchOutcome, MatchRequest};
use crate::models::opportunity::PlacementOpportunity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContentQuery {
    pub source_content_id: Uuid,
}

/// POST /api/v1/opportunities/match
///
/// Scores a tracked page against other users' pages and upserts the results.
/// Returns either the "already exist" short-circuit or a run summary.
pub async fn handle_match(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchOutcome>, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::InvalidRequest(format!("Invalid JSON body: {e}")))?;
    let outcome = state.matcher.process(&request).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/opportunities?sourceContentId=...
///
/// Persisted opportunities for one source page, best first.
pub async fn handle_list_opportunities(
    State(state): State<AppState>,
    Query(params): Query<SourceContentQuery>,
) -> Result<Json<Vec<PlacementOpportunity>>, AppError> {
    let rows = state.store.list_opportunities(params.source_content_id).await?;
    Ok(Json(rows))
}
