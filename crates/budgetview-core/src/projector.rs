//! Projection of fetch state into renderable table parts

use serde::Serialize;

use crate::columns::{CellValue, ColumnDescriptor, ColumnId};
use crate::coordinator::FetchStatus;
use crate::pagination::PaginationController;
use crate::selection::SelectionTracker;
use crate::sort::{SortDirection, SortSpec};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const EMPTY_MESSAGE: &str = "Transactions is empty";
pub const NO_ENVELOPE_MESSAGE: &str = "Select an envelope to see its transactions";

/// One data row of the table body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRow {
    pub id: String,
    pub selected: bool,
    pub cells: Vec<CellValue>,
}

/// What the table body shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderPlan {
    /// Placeholder row spanning `columns` cells
    Loading { columns: usize },
    Empty { message: String },
    Rows { rows: Vec<RenderRow> },
    Error { message: String },
}

impl RenderPlan {
    /// Cells of the loading placeholder row: the message, then blanks
    pub fn loading_cells(columns: usize) -> Vec<CellValue> {
        (0..columns.max(1))
            .map(|i| CellValue::text(if i == 0 { LOADING_MESSAGE } else { "" }))
            .collect()
    }
}

/// Decide what the table body renders for a fetch status.
///
/// An error replaces any earlier rows entirely.
pub fn project(
    status: &FetchStatus,
    columns: &[ColumnDescriptor],
    selection: &SelectionTracker,
) -> RenderPlan {
    match status {
        FetchStatus::Idle => RenderPlan::Empty {
            message: NO_ENVELOPE_MESSAGE.to_string(),
        },
        FetchStatus::Pending => RenderPlan::Loading {
            columns: columns.len(),
        },
        FetchStatus::Success { rows, .. } if rows.is_empty() => RenderPlan::Empty {
            message: EMPTY_MESSAGE.to_string(),
        },
        FetchStatus::Success { rows, .. } => RenderPlan::Rows {
            rows: rows
                .iter()
                .map(|record| RenderRow {
                    id: record.id.clone(),
                    selected: selection.is_selected(&record.id),
                    cells: columns.iter().map(|column| column.cell(record)).collect(),
                })
                .collect(),
        },
        FetchStatus::Error { message } => RenderPlan::Error {
            message: message.clone(),
        },
    }
}

/// One header cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderCell {
    pub id: ColumnId,
    pub label: &'static str,
    pub sortable: bool,
    pub active: bool,
    pub direction: SortDirection,
}

pub fn header(columns: &[ColumnDescriptor], sort: &SortSpec, sortable: bool) -> Vec<HeaderCell> {
    columns
        .iter()
        .map(|column| HeaderCell {
            id: column.id,
            label: column.label,
            sortable,
            active: sortable && sort.field == column.id,
            direction: sort.direction_for(column.id),
        })
        .collect()
}

/// State of the pagination control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationPlan {
    pub total: u64,
    pub page_index: usize,
    pub page_size: usize,
    pub options: Vec<usize>,
    pub last_page_index: usize,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

/// Pagination control, shown once the envelope document count is known
pub fn pagination_plan(pages: &PaginationController, pending: bool) -> Option<PaginationPlan> {
    let total = pages.total()?;
    let state = pages.state();
    Some(PaginationPlan {
        total,
        page_index: state.page_index,
        page_size: state.page_size,
        options: pages.options().to_vec(),
        last_page_index: pages.last_page_index().unwrap_or(0),
        can_go_back: pages.can_go_back(),
        can_go_forward: pages.can_go_forward(pending),
    })
}
