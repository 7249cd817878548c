//! HTTP host for the transaction view, with HTMX support
//!
//! Routes are organized into modules:
//! - routes::transactions: Transaction table, sorting, paging, filtering
//! - routes::envelopes: Envelope list

pub mod error;
pub mod routes;

use axum::{
    routing::{delete, get, post},
    Router,
};
use budgetview_config::Config;
use budgetview_core::ViewHandle;
use budgetview_store::MemoryStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub view: ViewHandle,
    pub store: Arc<MemoryStore>,
    pub config: Config,
}

impl AppState {
    /// How long a request waits for a fetch to resolve before rendering
    /// the loading state
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.config.view.settle_timeout_ms)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::envelopes::api_envelopes;
    use routes::transactions::{
        api_create_transaction, api_delete_transaction, api_view, htmx_clear_selection,
        htmx_filter, htmx_filter_reset, htmx_select_envelope, htmx_select_row, htmx_set_page,
        htmx_set_page_size, htmx_sort, htmx_transactions_table, page_transactions,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/view", get(api_view))
        .route("/api/envelopes", get(api_envelopes))
        .route("/api/transactions", post(api_create_transaction))
        .route("/api/transactions/:id", delete(api_delete_transaction))
        // HTMX page routes
        .route("/", get(page_transactions))
        .route("/transactions", get(page_transactions))
        // HTMX partial routes
        .route("/transactions/table", get(htmx_transactions_table))
        .route("/transactions/envelope", post(htmx_select_envelope))
        .route("/transactions/sort/:column", post(htmx_sort))
        .route("/transactions/select/:id", post(htmx_select_row))
        .route("/transactions/selection/clear", post(htmx_clear_selection))
        .route("/transactions/page", post(htmx_set_page))
        .route("/transactions/page-size", post(htmx_set_page_size))
        .route("/transactions/filter", post(htmx_filter))
        .route("/transactions/filter/reset", post(htmx_filter_reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Budget</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        budgetview_utils::escape_html(title),
        content
    )
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='p-6'>{}</main>"#, inner_content)
    } else {
        base_html(
            title,
            &format!(
                r#"<div class='max-w-6xl mx-auto'>
    <header class='px-6 pt-6'><h1 class='text-xl font-bold text-indigo-600'>Budget</h1></header>
    <main class='p-6'>{}</main>
</div>"#,
                inner_content
            ),
        )
    }
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until the listener fails.
pub async fn start_server(
    config: Config,
    view: ViewHandle,
    store: Arc<MemoryStore>,
) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { view, store, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!(target: "budgetview::api", "Starting server on http://{}", addr);
    log::info!(target: "budgetview::api", "Available routes:");
    log::info!(target: "budgetview::api", "  - /transactions (Transaction table)");
    log::info!(target: "budgetview::api", "  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!(target: "budgetview::api", "Server stopped gracefully");
    Ok(())
}
