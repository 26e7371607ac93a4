//! Slip API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<SlipSession>`.
//! Store mutations always answer 200: whether the change was applied is
//! reported in the `outcome` field, next to the refreshed slip.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::gate::SubmitError;
use crate::engine::session::{SlipSession, SlipView};
use crate::store::StoreOutcome;
use crate::types::{BatchReceipt, OutcomeKind, Selection};

pub type AppState = Arc<SlipSession>;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AddSelectionRequest {
    pub selection_id: String,
    pub event_id: String,
    #[serde(default)]
    pub event_label: String,
    pub outcome_kind: OutcomeKind,
    pub odds: Decimal,
    /// Falls back to the configured default stake.
    #[serde(default)]
    pub stake: Option<Decimal>,
}

/// Stake input as typed by the user: a number or a string.
#[derive(Debug, Clone, Deserialize)]
pub struct StakeRequest {
    #[serde(default)]
    pub stake: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    pub outcome: StoreOutcome,
    pub slip: SlipView,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub receipt: BatchReceipt,
    pub slip: SlipView,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitErrorResponse {
    pub error: String,
    /// True when the slip never left the client.
    pub local: bool,
    pub slip: SlipView,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// GET /api/slip
pub async fn get_slip(State(state): State<AppState>) -> Json<SlipView> {
    Json(state.view().await)
}

/// POST /api/slip/selections
pub async fn add_selection(
    State(state): State<AppState>,
    Json(req): Json<AddSelectionRequest>,
) -> Json<MutationResponse> {
    let selection = Selection::new(
        req.selection_id,
        req.event_id,
        req.event_label,
        req.outcome_kind,
        req.odds,
        req.stake.unwrap_or_else(|| state.default_stake()),
    );
    let outcome = state.add_selection(selection).await;
    respond(&state, outcome).await
}

/// DELETE /api/slip/selections/:event_id/:selection_id
pub async fn remove_selection(
    State(state): State<AppState>,
    Path((event_id, selection_id)): Path<(String, String)>,
) -> Json<MutationResponse> {
    let outcome = state.remove_selection(&selection_id, &event_id).await;
    respond(&state, outcome).await
}

/// PUT /api/slip/selections/:event_id/:selection_id/stake
pub async fn edit_stake(
    State(state): State<AppState>,
    Path((event_id, selection_id)): Path<(String, String)>,
    Json(req): Json<StakeRequest>,
) -> Json<MutationResponse> {
    let outcome = state
        .edit_stake_value(&selection_id, &event_id, &req.stake)
        .await;
    respond(&state, outcome).await
}

/// PUT /api/slip/stake
pub async fn set_uniform_stake(
    State(state): State<AppState>,
    Json(req): Json<StakeRequest>,
) -> Json<MutationResponse> {
    let outcome = state.set_uniform_stake_value(&req.stake).await;
    respond(&state, outcome).await
}

/// DELETE /api/slip
pub async fn clear_slip(State(state): State<AppState>) -> Json<MutationResponse> {
    let outcome = state.clear().await;
    respond(&state, outcome).await
}

/// POST /api/slip/submit
pub async fn submit(
    State(state): State<AppState>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<SubmitErrorResponse>)> {
    match state.submit().await {
        Ok(receipt) => Ok(Json(SubmitResponse {
            receipt,
            slip: state.view().await,
        })),
        Err(e) => {
            let status = match &e {
                SubmitError::InFlight => StatusCode::CONFLICT,
                SubmitError::Channel(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            Err((
                status,
                Json(SubmitErrorResponse {
                    error: e.to_string(),
                    local: e.is_local(),
                    slip: state.view().await,
                }),
            ))
        }
    }
}

async fn respond(state: &SlipSession, outcome: StoreOutcome) -> Json<MutationResponse> {
    Json(MutationResponse {
        outcome,
        slip: state.view().await,
    })
}
