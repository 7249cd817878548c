//! Transactions API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_view: Current view snapshot (JSON)
//! - api_create_transaction: Create a transaction (JSON)
//! - api_delete_transaction: Delete a transaction (JSON)
//! - htmx_*: View events, each answered with the refreshed table fragment

use crate::routes::transactions::page::render_view;
use crate::{ApiError, AppState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::{Form, Json};
use budgetview_core::{
    ColumnId, CoreError, FilterCriteria, MutationKind, NewTransaction, TransactionRecord,
    ViewEvent, ViewSnapshot,
};
use serde::Deserialize;
use std::collections::HashMap;

async fn settle_and_render(state: &AppState, event: ViewEvent) -> Result<Html<String>, ApiError> {
    let snapshot = state.view.settle(event, state.settle_timeout()).await?;
    Ok(Html(render_view(&snapshot)))
}

/// Current view snapshot (JSON API)
pub async fn api_view(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(state.view.snapshot())
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub envelope: String,
    #[serde(flatten)]
    pub transaction: NewTransaction,
}

/// Create a transaction, then let the view refetch (JSON API)
pub async fn api_create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionRecord>), ApiError> {
    let record = state
        .store
        .create_transaction(&state.config.source.user_id, &request.envelope, request.transaction)
        .await?;
    state
        .view
        .dispatch(ViewEvent::MutationCompleted(MutationKind::Create))
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Delete a transaction, then let the view refetch (JSON API)
pub async fn api_delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionRecord>, ApiError> {
    let record = state
        .store
        .delete_transaction(&state.config.source.user_id, &id)
        .await?;
    state
        .view
        .dispatch(ViewEvent::MutationCompleted(MutationKind::Delete))
        .await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct EnvelopeForm {
    #[serde(default)]
    pub envelope: String,
}

/// HTMX: select an envelope (empty value clears the selection)
pub async fn htmx_select_envelope(
    State(state): State<AppState>,
    Form(form): Form<EnvelopeForm>,
) -> Result<Html<String>, ApiError> {
    let envelope = form.envelope.trim();
    let envelope = if envelope.is_empty() {
        None
    } else {
        Some(envelope.to_string())
    };
    settle_and_render(&state, ViewEvent::SelectEnvelope(envelope)).await
}

/// HTMX: toggle sorting on a column
pub async fn htmx_sort(
    State(state): State<AppState>,
    Path(column): Path<String>,
) -> Result<Html<String>, ApiError> {
    let column: ColumnId = column.parse()?;
    settle_and_render(&state, ViewEvent::ToggleSort(column)).await
}

/// HTMX: select a row
pub async fn htmx_select_row(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let snapshot = state.view.dispatch(ViewEvent::SelectRow(id)).await?;
    Ok(Html(render_view(&snapshot)))
}

/// HTMX: clear the row selection
pub async fn htmx_clear_selection(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let snapshot = state.view.dispatch(ViewEvent::ClearSelection).await?;
    Ok(Html(render_view(&snapshot)))
}

#[derive(Debug, Deserialize)]
pub struct PageForm {
    pub page_index: usize,
}

/// HTMX: go to a page
pub async fn htmx_set_page(
    State(state): State<AppState>,
    Form(form): Form<PageForm>,
) -> Result<Html<String>, ApiError> {
    settle_and_render(&state, ViewEvent::SetPage(form.page_index)).await
}

#[derive(Debug, Deserialize)]
pub struct PageSizeForm {
    pub page_size: usize,
}

/// HTMX: change rows per page
pub async fn htmx_set_page_size(
    State(state): State<AppState>,
    Form(form): Form<PageSizeForm>,
) -> Result<Html<String>, ApiError> {
    if form.page_size == 0 {
        return Err(CoreError::InvalidPageSize { size: 0 }.into());
    }
    settle_and_render(&state, ViewEvent::SetPageSize(form.page_size)).await
}

/// Decode an urlencoded form body. Repeated keys are joined with commas.
pub fn parse_form_body(body: &str) -> HashMap<String, String> {
    let mut params: HashMap<String, String> = HashMap::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = urlencoding::decode(&key.replace('+', " "))
            .map(|k| k.into_owned())
            .unwrap_or_default();
        let value = urlencoding::decode(&value.replace('+', " "))
            .map(|v| v.into_owned())
            .unwrap_or_default();
        params
            .entry(key)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    params
}

/// HTMX: submit the filter form
pub async fn htmx_filter(State(state): State<AppState>, body: String) -> Result<Html<String>, ApiError> {
    let params = parse_form_body(&body);
    let field = |name: &str| params.get(name).map(String::as_str).unwrap_or("");
    let criteria = FilterCriteria::from_form(field("date"), field("categories"), field("type"))?;
    settle_and_render(&state, ViewEvent::SubmitFilter(criteria)).await
}

/// HTMX: clear all filters
pub async fn htmx_filter_reset(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    settle_and_render(&state, ViewEvent::ResetFilter).await
}
