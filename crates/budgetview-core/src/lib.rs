//! Transaction list view state and query coordination
//!
//! The view keeps one envelope's transaction table in sync with a remote
//! [`TransactionSource`]: sorting, filtering, pagination and row selection
//! feed a single query, and the fetch outcome is projected into a
//! [`RenderPlan`] for whatever host draws the table.

pub mod columns;
pub mod coordinator;
pub mod error;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod projector;
pub mod runtime;
pub mod selection;
pub mod sort;
pub mod source;
pub mod view;

pub use columns::{CellValue, ColumnDescriptor, ColumnId, FieldValue, Tone, COLUMNS};
pub use coordinator::{FetchStatus, FetchTicket, MetaTicket, MutationKind, QueryCoordinator};
pub use error::{CoreError, CoreResult, ErrorSeverity, SourceError};
pub use filter::{matches_all, normalize, FilterConstraint, FilterCriteria, FilterField, FilterValue};
pub use models::{Envelope, EnvelopeMeta, NewTransaction, TransactionRecord, TransactionType};
pub use pagination::{PageState, PaginationController};
pub use projector::{HeaderCell, PaginationPlan, RenderPlan, RenderRow};
pub use runtime::{ViewHandle, ViewRuntime};
pub use selection::SelectionTracker;
pub use sort::{SortDirection, SortSpec};
pub use source::{QueryDescriptor, SourceRef, TransactionSource};
pub use view::{TransactionView, ViewCommand, ViewEvent, ViewOptions, ViewSnapshot};
