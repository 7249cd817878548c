//! Query coordination
//!
//! The coordinator turns the current envelope, page, sort and filter into a
//! [`QueryDescriptor`] and decides when a new fetch is needed. Each issued
//! fetch gets a generation number; a completion is applied only when it
//! carries the latest generation, so a slow response to a superseded query
//! can never overwrite the status of a newer one.

use serde::Serialize;

use crate::error::SourceError;
use crate::filter::FilterConstraint;
use crate::models::{EnvelopeMeta, TransactionRecord};
use crate::pagination::PageState;
use crate::sort::SortSpec;
use crate::source::QueryDescriptor;

/// Outcome of the authoritative transaction fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FetchStatus {
    Idle,
    Pending,
    Success {
        rows: Vec<TransactionRecord>,
        /// Fetched because a transaction was created or deleted
        mutation_echo: bool,
    },
    Error {
        message: String,
    },
}

impl FetchStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, FetchStatus::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchStatus::Success { .. })
    }
}

/// Kind of write that changes an envelope's rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Create,
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MutationCounters {
    created: u64,
    deleted: u64,
}

/// A page fetch to run against the source
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: QueryDescriptor,
    pub mutation_echo: bool,
}

/// An envelope meta fetch to run against the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTicket {
    pub generation: u64,
    pub user_id: String,
    pub envelope: String,
}

#[derive(Debug, Clone)]
pub struct QueryCoordinator {
    user_id: String,
    envelope: Option<String>,
    sort: SortSpec,
    filter: Vec<FilterConstraint>,
    pagination: bool,
    status: FetchStatus,
    generation: u64,
    last_issued: Option<QueryDescriptor>,
    mutations: MutationCounters,
    observed: MutationCounters,
    meta_generation: u64,
}

impl QueryCoordinator {
    pub fn new(user_id: impl Into<String>, sort: SortSpec, pagination: bool) -> Self {
        Self {
            user_id: user_id.into(),
            envelope: None,
            sort,
            filter: Vec::new(),
            pagination,
            status: FetchStatus::Idle,
            generation: 0,
            last_issued: None,
            mutations: MutationCounters::default(),
            observed: MutationCounters::default(),
            meta_generation: 0,
        }
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn envelope(&self) -> Option<&str> {
        self.envelope.as_deref()
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn filter(&self) -> &[FilterConstraint] {
        &self.filter
    }

    /// Generation of the most recently issued page fetch
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Select an envelope, or none.
    ///
    /// Any change of envelope invalidates the meta request in flight.
    /// Clearing the envelope also returns the status to `Idle` and
    /// invalidates the page fetch in flight.
    pub fn set_envelope(&mut self, envelope: Option<String>) {
        if envelope != self.envelope {
            self.meta_generation += 1;
        }
        if envelope.is_none() {
            self.generation += 1;
            self.last_issued = None;
            self.status = FetchStatus::Idle;
        }
        self.envelope = envelope;
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn set_filter(&mut self, filter: Vec<FilterConstraint>) {
        self.filter = filter;
    }

    /// Record that a create or delete finished somewhere in the system
    pub fn observe_mutation(&mut self, kind: MutationKind) {
        match kind {
            MutationKind::Create => self.mutations.created += 1,
            MutationKind::Delete => self.mutations.deleted += 1,
        }
    }

    /// Query for the current inputs, if an envelope is selected
    pub fn descriptor(&self, page: PageState) -> Option<QueryDescriptor> {
        let envelope = self.envelope.clone()?;
        Some(QueryDescriptor {
            user_id: self.user_id.clone(),
            envelope,
            limit: page.page_size,
            offset: page.offset(),
            sort: self.sort,
            filter: self.filter.clone(),
        })
    }

    /// Issue a fetch if the inputs changed or a mutation completed since the
    /// last one. Issuing marks the status pending.
    pub fn reconcile(&mut self, page: PageState) -> Option<FetchTicket> {
        let query = self.descriptor(page)?;
        let mutated = self.mutations != self.observed;

        if !mutated && self.last_issued.as_ref() == Some(&query) {
            return None;
        }

        self.generation += 1;
        self.observed = self.mutations;
        self.last_issued = Some(query.clone());
        self.status = FetchStatus::Pending;

        log::debug!(
            target: "budgetview::coordinator",
            "Issuing fetch #{} for envelope '{}' (offset={}, limit={}, sort={}:{}, filters={}, mutation={})",
            self.generation,
            query.envelope,
            query.offset,
            query.limit,
            query.sort.field,
            query.sort.direction,
            query.filter.len(),
            mutated
        );

        Some(FetchTicket {
            generation: self.generation,
            query,
            mutation_echo: mutated,
        })
    }

    /// Apply a page fetch result. Returns false when the result belongs to a
    /// superseded request and was dropped.
    pub fn complete(
        &mut self,
        generation: u64,
        mutation_echo: bool,
        result: Result<Vec<TransactionRecord>, SourceError>,
    ) -> bool {
        if generation != self.generation || !self.status.is_pending() {
            log::debug!(
                target: "budgetview::coordinator",
                "Dropping stale response #{} (latest is #{})",
                generation,
                self.generation
            );
            return false;
        }

        self.status = match result {
            Ok(rows) => FetchStatus::Success { rows, mutation_echo },
            Err(error) => FetchStatus::Error {
                message: error.to_string(),
            },
        };
        true
    }

    /// Request envelope totals after a successful fetch, when paginating
    pub fn meta_request(&mut self) -> Option<MetaTicket> {
        if !self.pagination || !self.status.is_success() {
            return None;
        }
        let envelope = self.envelope.clone()?;

        self.meta_generation += 1;
        Some(MetaTicket {
            generation: self.meta_generation,
            user_id: self.user_id.clone(),
            envelope,
        })
    }

    /// Accept envelope totals for the latest meta request only
    pub fn complete_meta(
        &mut self,
        generation: u64,
        result: Result<EnvelopeMeta, SourceError>,
    ) -> Option<EnvelopeMeta> {
        if generation != self.meta_generation {
            return None;
        }
        match result {
            Ok(meta) => Some(meta),
            Err(error) => {
                log::warn!(
                    target: "budgetview::coordinator",
                    "Envelope meta request #{} failed: {}",
                    generation,
                    error
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnId;
    use crate::filter::{normalize, FilterCriteria};
    use crate::sort::SortDirection;

    fn page(index: usize, size: usize) -> PageState {
        PageState {
            page_index: index,
            page_size: size,
        }
    }

    fn coordinator() -> QueryCoordinator {
        let mut coordinator = QueryCoordinator::new("user-1", SortSpec::default(), true);
        coordinator.set_envelope(Some("Groceries".to_string()));
        coordinator
    }

    #[test]
    fn test_no_envelope_is_inert() {
        let mut coordinator = QueryCoordinator::new("user-1", SortSpec::default(), true);
        assert!(coordinator.descriptor(page(0, 10)).is_none());
        assert!(coordinator.reconcile(page(0, 10)).is_none());
        assert_eq!(coordinator.status(), &FetchStatus::Idle);
    }

    #[test]
    fn test_descriptor_fields() {
        let mut coordinator = coordinator();
        coordinator.set_sort(SortSpec::new(ColumnId::Amount, SortDirection::Asc));
        let query = coordinator.descriptor(page(2, 25)).unwrap();

        assert_eq!(query.user_id, "user-1");
        assert_eq!(query.envelope, "Groceries");
        assert_eq!(query.limit, 25);
        assert_eq!(query.offset, 50);
        assert_eq!(query.sort.field, ColumnId::Amount);
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_reconcile_only_on_change() {
        let mut coordinator = coordinator();
        let first = coordinator.reconcile(page(0, 10)).unwrap();
        assert_eq!(first.generation, 1);
        assert!(!first.mutation_echo);
        assert!(coordinator.status().is_pending());

        assert!(coordinator.reconcile(page(0, 10)).is_none());

        let second = coordinator.reconcile(page(1, 10)).unwrap();
        assert_eq!(second.generation, 2);

        coordinator.set_sort(SortSpec::default().toggled(ColumnId::Date));
        assert!(coordinator.reconcile(page(1, 10)).is_some());

        coordinator.set_filter(normalize(&FilterCriteria {
            categories: vec!["food".to_string()],
            ..FilterCriteria::default()
        }));
        assert!(coordinator.reconcile(page(1, 10)).is_some());

        coordinator.set_envelope(Some("Rent".to_string()));
        assert!(coordinator.reconcile(page(1, 10)).is_some());
    }

    #[test]
    fn test_mutation_forces_refetch_of_same_query() {
        let mut coordinator = coordinator();
        let first = coordinator.reconcile(page(0, 10)).unwrap();
        assert!(coordinator.complete(first.generation, first.mutation_echo, Ok(vec![])));

        coordinator.observe_mutation(MutationKind::Delete);
        let refetch = coordinator.reconcile(page(0, 10)).unwrap();
        assert!(refetch.mutation_echo);
        assert_eq!(refetch.query, first.query);

        assert!(coordinator.complete(refetch.generation, refetch.mutation_echo, Ok(vec![])));
        assert_eq!(
            coordinator.status(),
            &FetchStatus::Success { rows: vec![], mutation_echo: true }
        );
        assert!(coordinator.reconcile(page(0, 10)).is_none());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut coordinator = coordinator();
        let r1 = coordinator.reconcile(page(0, 10)).unwrap();
        let r2 = coordinator.reconcile(page(1, 10)).unwrap();

        assert!(coordinator.complete(r2.generation, false, Ok(vec![])));
        assert!(!coordinator.complete(r1.generation, false, Err(SourceError::rejected("late failure"))));
        assert_eq!(
            coordinator.status(),
            &FetchStatus::Success { rows: vec![], mutation_echo: false }
        );
    }

    #[test]
    fn test_stale_response_while_newer_pending() {
        let mut coordinator = coordinator();
        let r1 = coordinator.reconcile(page(0, 10)).unwrap();
        let _r2 = coordinator.reconcile(page(1, 10)).unwrap();

        assert!(!coordinator.complete(r1.generation, false, Ok(vec![])));
        assert!(coordinator.status().is_pending());
    }

    #[test]
    fn test_error_is_verbatim() {
        let mut coordinator = coordinator();
        let ticket = coordinator.reconcile(page(0, 10)).unwrap();
        coordinator.complete(ticket.generation, false, Err(SourceError::rejected("Network Error")));
        assert_eq!(
            coordinator.status(),
            &FetchStatus::Error { message: "Network Error".to_string() }
        );
        assert!(coordinator.meta_request().is_none());
    }

    #[test]
    fn test_duplicate_completion_ignored() {
        let mut coordinator = coordinator();
        let ticket = coordinator.reconcile(page(0, 10)).unwrap();
        assert!(coordinator.complete(ticket.generation, false, Ok(vec![])));
        assert!(!coordinator.complete(ticket.generation, false, Err(SourceError::rejected("again"))));
        assert!(coordinator.status().is_success());
    }

    #[test]
    fn test_clearing_envelope_invalidates_in_flight() {
        let mut coordinator = coordinator();
        let ticket = coordinator.reconcile(page(0, 10)).unwrap();
        coordinator.set_envelope(None);

        assert_eq!(coordinator.status(), &FetchStatus::Idle);
        assert!(!coordinator.complete(ticket.generation, false, Ok(vec![])));
        assert_eq!(coordinator.status(), &FetchStatus::Idle);

        coordinator.set_envelope(Some("Groceries".to_string()));
        assert!(coordinator.reconcile(page(0, 10)).is_some());
    }

    #[test]
    fn test_meta_requests() {
        let mut coordinator = coordinator();
        assert!(coordinator.meta_request().is_none());

        let ticket = coordinator.reconcile(page(0, 10)).unwrap();
        coordinator.complete(ticket.generation, false, Ok(vec![]));

        let first = coordinator.meta_request().unwrap();
        let second = coordinator.meta_request().unwrap();
        assert_eq!(second.envelope, "Groceries");
        assert_eq!(second.user_id, "user-1");

        let meta = EnvelopeMeta { documents_count: 7 };
        assert_eq!(coordinator.complete_meta(first.generation, Ok(meta)), None);
        assert_eq!(coordinator.complete_meta(second.generation, Ok(meta)), Some(meta));
        assert_eq!(
            coordinator.complete_meta(second.generation, Err(SourceError::rejected("x"))),
            None
        );
    }

    #[test]
    fn test_switching_envelope_invalidates_meta() {
        let mut coordinator = coordinator();
        let ticket = coordinator.reconcile(page(0, 10)).unwrap();
        coordinator.complete(ticket.generation, false, Ok(vec![]));
        let groceries = coordinator.meta_request().unwrap();

        coordinator.set_envelope(Some("Rent".to_string()));
        let meta = EnvelopeMeta { documents_count: 99 };
        assert_eq!(coordinator.complete_meta(groceries.generation, Ok(meta)), None);

        // Re-selecting the same envelope keeps the request valid
        let ticket = coordinator.reconcile(page(0, 10)).unwrap();
        coordinator.complete(ticket.generation, false, Ok(vec![]));
        let rent = coordinator.meta_request().unwrap();
        coordinator.set_envelope(Some("Rent".to_string()));
        assert_eq!(coordinator.complete_meta(rent.generation, Ok(meta)), Some(meta));
    }

    #[test]
    fn test_no_meta_without_pagination() {
        let mut coordinator = QueryCoordinator::new("user-1", SortSpec::default(), false);
        coordinator.set_envelope(Some("Groceries".to_string()));
        let ticket = coordinator.reconcile(page(0, 10)).unwrap();
        coordinator.complete(ticket.generation, false, Ok(vec![]));
        assert!(coordinator.meta_request().is_none());
    }
}
