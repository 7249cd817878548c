//! Envelope API endpoints

use crate::AppState;
use axum::Json;
use budgetview_core::Envelope;

/// Envelopes of the configured user (JSON API)
pub async fn api_envelopes(state: axum::extract::State<AppState>) -> Json<Vec<Envelope>> {
    Json(state.store.envelopes(&state.config.source.user_id).await)
}
