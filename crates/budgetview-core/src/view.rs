//! Transaction view state and its event reducer
//!
//! [`TransactionView`] owns every piece of view state. Hosts feed it
//! [`ViewEvent`]s; it answers with the [`ViewCommand`]s (source requests)
//! the event made necessary. Fetch results come back in as events too, so
//! all mutation goes through [`TransactionView::dispatch`].

use budgetview_config::Config;
use serde::Serialize;

use crate::columns::{ColumnDescriptor, ColumnId, COLUMNS};
use crate::coordinator::{FetchStatus, FetchTicket, MetaTicket, MutationKind, QueryCoordinator};
use crate::error::{CoreError, CoreResult, SourceError};
use crate::filter::{normalize, FilterCriteria};
use crate::models::{EnvelopeMeta, TransactionRecord};
use crate::pagination::{PageState, PaginationController};
use crate::projector::{header, pagination_plan, project, HeaderCell, PaginationPlan, RenderPlan};
use crate::selection::SelectionTracker;
use crate::sort::SortSpec;

/// Static view settings
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub user_id: String,
    /// Fetch envelope totals and show the pagination control
    pub pagination: bool,
    /// Accept filter input and sortable headers
    pub filtering: bool,
    pub per_page: usize,
    pub rows_per_page_options: Vec<usize>,
    pub default_sort: SortSpec,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            pagination: false,
            filtering: false,
            per_page: 10,
            rows_per_page_options: Vec::new(),
            default_sort: SortSpec::default(),
        }
    }
}

impl ViewOptions {
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let field: ColumnId = config
            .view
            .default_sort_field
            .parse()
            .map_err(|e: CoreError| CoreError::ConfigError {
                message: format!("view.default_sort_field: {}", e),
            })?;

        Ok(Self {
            user_id: config.source.user_id.clone(),
            pagination: config.view.pagination_enable,
            filtering: config.view.filter_enable,
            per_page: config.view.per_page,
            rows_per_page_options: config.page_size_options(),
            default_sort: SortSpec::new(field, config.view.default_sort_direction.into()),
        })
    }
}

/// Something that happened to the view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    SelectEnvelope(Option<String>),
    ToggleSort(ColumnId),
    SelectRow(String),
    ClearSelection,
    SetPage(usize),
    SetPageSize(usize),
    SubmitFilter(FilterCriteria),
    ResetFilter,
    MutationCompleted(MutationKind),
    PageLoaded {
        generation: u64,
        mutation_echo: bool,
        result: Result<Vec<TransactionRecord>, SourceError>,
    },
    MetaLoaded {
        generation: u64,
        result: Result<EnvelopeMeta, SourceError>,
    },
}

/// Source request the host must run
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    FetchPage(FetchTicket),
    FetchMeta(MetaTicket),
}

/// Everything needed to draw the view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub envelope: Option<String>,
    pub header: Vec<HeaderCell>,
    pub body: RenderPlan,
    pub pagination: Option<PaginationPlan>,
    pub page: PageState,
    pub selected_id: Option<String>,
    pub sort: SortSpec,
    pub filter: FilterCriteria,
    pub filtering: bool,
    pub pending: bool,
}

pub struct TransactionView {
    options: ViewOptions,
    columns: &'static [ColumnDescriptor],
    coordinator: QueryCoordinator,
    pages: PaginationController,
    selection: SelectionTracker,
    criteria: FilterCriteria,
}

impl TransactionView {
    pub fn new(options: ViewOptions) -> CoreResult<Self> {
        let pages = PaginationController::new(options.per_page, options.rows_per_page_options.clone())?;
        let coordinator =
            QueryCoordinator::new(options.user_id.clone(), options.default_sort, options.pagination);
        Ok(Self {
            options,
            columns: &COLUMNS,
            coordinator,
            pages,
            selection: SelectionTracker::new(),
            criteria: FilterCriteria::default(),
        })
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn status(&self) -> &FetchStatus {
        self.coordinator.status()
    }

    pub fn page(&self) -> PageState {
        self.pages.state()
    }

    pub fn is_last_page(&self) -> bool {
        self.pages.is_last_page()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected()
    }

    /// Apply one event and return the source requests it requires
    pub fn dispatch(&mut self, event: ViewEvent) -> Vec<ViewCommand> {
        match event {
            ViewEvent::SelectEnvelope(envelope) => {
                if envelope.as_deref() != self.coordinator.envelope() {
                    log::info!(target: "budgetview::view", "Envelope selected: {:?}", envelope);
                    self.pages.rewind();
                    self.pages.forget_meta();
                }
                self.coordinator.set_envelope(envelope);
                self.refresh()
            }
            ViewEvent::ToggleSort(field) => {
                if !self.options.filtering {
                    log::debug!(target: "budgetview::view", "Sorting disabled, ignoring click on '{}'", field);
                    return Vec::new();
                }
                let sort = self.coordinator.sort().toggled(field);
                self.coordinator.set_sort(sort);
                self.refresh()
            }
            ViewEvent::SelectRow(id) => {
                self.selection.select(id);
                Vec::new()
            }
            ViewEvent::ClearSelection => {
                self.selection.clear();
                Vec::new()
            }
            ViewEvent::SetPage(page_index) => {
                self.pages.set_page(page_index);
                self.refresh()
            }
            ViewEvent::SetPageSize(page_size) => {
                if let Err(e) = self.pages.set_page_size(page_size) {
                    log::warn!(target: "budgetview::view", "Ignoring page size change: {}", e);
                    return Vec::new();
                }
                self.refresh()
            }
            ViewEvent::SubmitFilter(criteria) => {
                if !self.options.filtering {
                    log::debug!(target: "budgetview::view", "Filtering disabled, ignoring filter submit");
                    return Vec::new();
                }
                self.apply_filter(criteria)
            }
            ViewEvent::ResetFilter => {
                if !self.options.filtering {
                    return Vec::new();
                }
                self.apply_filter(FilterCriteria::default())
            }
            ViewEvent::MutationCompleted(kind) => {
                log::debug!(target: "budgetview::view", "Mutation completed: {:?}", kind);
                self.coordinator.observe_mutation(kind);
                self.refresh()
            }
            ViewEvent::PageLoaded {
                generation,
                mutation_echo,
                result,
            } => {
                if !self.coordinator.complete(generation, mutation_echo, result) {
                    return Vec::new();
                }
                self.coordinator
                    .meta_request()
                    .map(ViewCommand::FetchMeta)
                    .into_iter()
                    .collect()
            }
            ViewEvent::MetaLoaded { generation, result } => {
                if let Some(meta) = self.coordinator.complete_meta(generation, result) {
                    self.pages.apply_meta(meta);
                }
                Vec::new()
            }
        }
    }

    fn apply_filter(&mut self, criteria: FilterCriteria) -> Vec<ViewCommand> {
        self.pages.rewind();
        self.coordinator.set_filter(normalize(&criteria));
        self.criteria = criteria;
        self.refresh()
    }

    fn refresh(&mut self) -> Vec<ViewCommand> {
        self.coordinator
            .reconcile(self.pages.state())
            .map(ViewCommand::FetchPage)
            .into_iter()
            .collect()
    }

    /// Current body plan
    pub fn render_plan(&self) -> RenderPlan {
        project(self.coordinator.status(), self.columns, &self.selection)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let pending = self.coordinator.status().is_pending();
        let pagination = if self.options.pagination {
            pagination_plan(&self.pages, pending)
        } else {
            None
        };

        ViewSnapshot {
            envelope: self.coordinator.envelope().map(str::to_string),
            header: header(self.columns, &self.coordinator.sort(), self.options.filtering),
            body: self.render_plan(),
            pagination,
            page: self.pages.state(),
            selected_id: self.selection.selected().map(str::to_string),
            sort: self.coordinator.sort(),
            filter: self.criteria.clone(),
            filtering: self.options.filtering,
            pending,
        }
    }
}
