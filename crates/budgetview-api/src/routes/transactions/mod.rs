//! Transaction routes - table, sorting, paging, filtering, selection
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page and fragment rendering

pub mod api;
pub mod page;

pub use api::{
    api_create_transaction,
    api_delete_transaction,
    api_view,
    htmx_clear_selection,
    htmx_filter,
    htmx_filter_reset,
    htmx_select_envelope,
    htmx_select_row,
    htmx_set_page,
    htmx_set_page_size,
    htmx_sort,
};

pub use page::{htmx_transactions_table, page_transactions};
