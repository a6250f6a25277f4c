use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::{
    AppState, ErrorResponse, bad_request, internal_error, not_found,
};
use crate::matching::MatchStore;
use crate::models::{DateProposal, Match, ProposalError};

/// A match as seen by one of its two users: the counterpart is reduced to an
/// id, internal fields never leave the backend.
#[derive(Debug, Serialize)]
pub struct MatchView {
    pub match_id: Uuid,
    pub partner: Uuid,
    /// 1 or 2, which side of the match the requesting user is
    pub side: u8,
    pub created_at: DateTime<Utc>,
    pub proposals: Vec<DateProposal>,
}

impl MatchView {
    fn for_user(record: &Match, user_id: Uuid) -> Option<Self> {
        let side = record.side_of(user_id)?;
        let partner = if side == 1 { record.user_b } else { record.user_a };
        Some(Self {
            match_id: record.id,
            partner,
            side,
            created_at: record.created_at,
            proposals: record.proposals.clone(),
        })
    }
}

async fn active_match_for(state: &AppState, uid: Uuid) -> Result<Match, ErrorResponse> {
    state
        .matches
        .find_match_for_user(uid)
        .await
        .map_err(|err| {
            tracing::error!("failed to look up match for {uid}: {err:#}");
            internal_error()
        })?
        .ok_or_else(|| not_found(format!("no active match for user {uid}")))
}

fn proposal_error_response(err: anyhow::Error) -> ErrorResponse {
    match err.downcast_ref::<ProposalError>() {
        Some(validation) => bad_request(validation.to_string()),
        None => {
            tracing::error!("proposal update failed: {err:#}");
            internal_error()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    pub uid: Uuid,
}

/// Current active match for a user
pub async fn get_match(
    State(state): State<AppState>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchView>, ErrorResponse> {
    let record = active_match_for(&state, query.uid).await?;
    let view = MatchView::for_user(&record, query.uid).ok_or_else(internal_error_unreachable)?;
    Ok(Json(view))
}

// find_match_for_user only returns matches involving the user, so a missing
// side means the store and the view disagree
fn internal_error_unreachable() -> ErrorResponse {
    tracing::error!("active match does not involve its own user");
    internal_error()
}

#[derive(Debug, Deserialize)]
pub struct ProposeRequest {
    pub uid: Uuid,
    pub at: DateTime<Utc>,
    pub location: String,
}

/// Propose a date to the matched partner
pub async fn propose_date(
    State(state): State<AppState>,
    Json(req): Json<ProposeRequest>,
) -> Result<Json<MatchView>, ErrorResponse> {
    let record = active_match_for(&state, req.uid).await?;
    let side = record
        .side_of(req.uid)
        .ok_or_else(internal_error_unreachable)?;

    let updated = state
        .matches
        .append_proposal(record.id, side, req.at, req.location)
        .await
        .map_err(proposal_error_response)?;

    let view = MatchView::for_user(&updated, req.uid).ok_or_else(internal_error_unreachable)?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct AcceptRequest {
    pub uid: Uuid,
    pub index: usize,
}

/// Agree on a previously proposed date
pub async fn accept_proposal(
    State(state): State<AppState>,
    Json(req): Json<AcceptRequest>,
) -> Result<Json<MatchView>, ErrorResponse> {
    let record = active_match_for(&state, req.uid).await?;
    let side = record
        .side_of(req.uid)
        .ok_or_else(internal_error_unreachable)?;

    let proposal = record
        .proposals
        .get(req.index)
        .ok_or_else(|| bad_request(format!("no proposal at index {}", req.index)))?;
    if proposal.made_by == side {
        return Err(bad_request("cannot accept your own proposal"));
    }

    let updated = state
        .matches
        .accept_proposal(record.id, req.index)
        .await
        .map_err(proposal_error_response)?;

    let view = MatchView::for_user(&updated, req.uid).ok_or_else(internal_error_unreachable)?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct UnmatchRequest {
    pub uid: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UnmatchResponse {
    pub match_id: Uuid,
}

/// Explicitly end the user's active match; both sides return to the idle pool
pub async fn unmatch(
    State(state): State<AppState>,
    Json(req): Json<UnmatchRequest>,
) -> Result<Json<UnmatchResponse>, ErrorResponse> {
    let released = state.engine.unmatch(req.uid).await.map_err(|err| {
        tracing::error!("unmatch failed for {}: {err:#}", req.uid);
        internal_error()
    })?;

    match released {
        Some(record) => Ok(Json(UnmatchResponse {
            match_id: record.id,
        })),
        None => Err(not_found(format!("no active match for user {}", req.uid))),
    }
}
