//! In-memory transaction store
//!
//! Holds envelopes and their transactions, loaded from a JSON data file,
//! and answers page and meta queries the way the remote API does.

pub mod error;

use async_trait::async_trait;
use budgetview_core::{
    matches_all, ColumnId, Envelope, EnvelopeMeta, NewTransaction, QueryDescriptor, SortDirection,
    SortSpec, SourceError, TransactionRecord, TransactionSource,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tokio::sync::RwLock;

pub use error::{StoreError, StoreResult};

/// A transaction together with its owner and envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTransaction {
    pub user_id: String,
    pub envelope: String,
    #[serde(flatten)]
    pub record: TransactionRecord,
}

/// Layout of the data file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub envelopes: Vec<Envelope>,
    #[serde(default)]
    pub transactions: Vec<StoredTransaction>,
}

impl StoreData {
    fn validate(&self) -> StoreResult<()> {
        let mut ids = HashSet::new();
        for stored in &self.transactions {
            if !ids.insert(stored.record.id.as_str()) {
                return Err(StoreError::InvalidData {
                    message: format!("duplicate transaction id '{}'", stored.record.id),
                });
            }
            if self.find_envelope(&stored.user_id, &stored.envelope).is_none() {
                log::warn!(
                    target: "budgetview::store",
                    "Transaction '{}' belongs to unknown envelope '{}'",
                    stored.record.id,
                    stored.envelope
                );
            }
        }
        Ok(())
    }

    fn find_envelope(&self, user_id: &str, name: &str) -> Option<&Envelope> {
        self.envelopes
            .iter()
            .find(|e| e.user_id == user_id && e.name == name)
    }

    fn require_envelope(&self, user_id: &str, name: &str) -> StoreResult<()> {
        match self.find_envelope(user_id, name) {
            Some(_) => Ok(()),
            None => Err(StoreError::EnvelopeNotFound {
                name: name.to_string(),
            }),
        }
    }

    fn in_envelope<'a>(
        &'a self,
        user_id: &'a str,
        envelope: &'a str,
    ) -> impl Iterator<Item = &'a TransactionRecord> + 'a {
        self.transactions
            .iter()
            .filter(move |t| t.user_id == user_id && t.envelope == envelope)
            .map(|t| &t.record)
    }
}

/// Order two records by a sort spec, breaking ties by id
pub fn compare_records(a: &TransactionRecord, b: &TransactionRecord, sort: &SortSpec) -> Ordering {
    let primary = match sort.field {
        ColumnId::Date => a.date.cmp(&b.date),
        ColumnId::Amount => a.amount.total_cmp(&b.amount),
        ColumnId::Type => a.kind.to_string().cmp(&b.kind.to_string()),
        ColumnId::Categories => a.categories.cmp(&b.categories),
        ColumnId::Currency => a.currency.cmp(&b.currency),
        ColumnId::Description => a.description.cmp(&b.description),
    };
    let primary = match sort.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

pub struct MemoryStore {
    data: RwLock<StoreData>,
    latency: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreData::default())
    }
}

impl MemoryStore {
    pub fn new(data: StoreData) -> Self {
        Self {
            data: RwLock::new(data),
            latency: Duration::ZERO,
        }
    }

    pub fn from_json(content: &str) -> StoreResult<Self> {
        let data: StoreData = serde_json::from_str(content)?;
        data.validate()?;
        Ok(Self::new(data))
    }

    /// Load a JSON data file
    pub async fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json(&content)?;
        {
            let data = store.data.read().await;
            log::info!(
                target: "budgetview::store",
                "Loaded {} envelopes and {} transactions from {}",
                data.envelopes.len(),
                data.transactions.len(),
                path.display()
            );
        }
        Ok(store)
    }

    /// Delay every source call, to make loading states visible
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Envelopes owned by a user, in file order
    pub async fn envelopes(&self, user_id: &str) -> Vec<Envelope> {
        let data = self.data.read().await;
        data.envelopes
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn create_transaction(
        &self,
        user_id: &str,
        envelope: &str,
        transaction: NewTransaction,
    ) -> StoreResult<TransactionRecord> {
        let mut data = self.data.write().await;
        data.require_envelope(user_id, envelope)?;

        let record = transaction.into_record(budgetview_utils::generate_id());
        data.transactions.push(StoredTransaction {
            user_id: user_id.to_string(),
            envelope: envelope.to_string(),
            record: record.clone(),
        });

        log::info!(
            target: "budgetview::store",
            "Created transaction '{}' in envelope '{}'",
            record.id,
            envelope
        );
        Ok(record)
    }

    pub async fn delete_transaction(&self, user_id: &str, id: &str) -> StoreResult<TransactionRecord> {
        let mut data = self.data.write().await;
        let position = data
            .transactions
            .iter()
            .position(|t| t.user_id == user_id && t.record.id == id)
            .ok_or_else(|| StoreError::TransactionNotFound { id: id.to_string() })?;

        let removed = data.transactions.remove(position);
        log::info!(
            target: "budgetview::store",
            "Deleted transaction '{}' from envelope '{}'",
            id,
            removed.envelope
        );
        Ok(removed.record)
    }

    async fn page(&self, query: &QueryDescriptor) -> StoreResult<Vec<TransactionRecord>> {
        let data = self.data.read().await;
        data.require_envelope(&query.user_id, &query.envelope)?;

        let mut rows: Vec<TransactionRecord> = data
            .in_envelope(&query.user_id, &query.envelope)
            .filter(|record| matches_all(&query.filter, record))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_records(a, b, &query.sort));

        Ok(rows.into_iter().skip(query.offset).take(query.limit).collect())
    }

    async fn meta(&self, user_id: &str, envelope: &str) -> StoreResult<EnvelopeMeta> {
        let data = self.data.read().await;
        data.require_envelope(user_id, envelope)?;
        Ok(EnvelopeMeta {
            documents_count: data.in_envelope(user_id, envelope).count() as u64,
        })
    }
}

#[async_trait]
impl TransactionSource for MemoryStore {
    async fn fetch_transaction_page(
        &self,
        query: &QueryDescriptor,
    ) -> Result<Vec<TransactionRecord>, SourceError> {
        self.simulate_latency().await;
        let rows = self.page(query).await?;
        log::debug!(
            target: "budgetview::store",
            "Served {} rows of '{}' (offset={}, limit={})",
            rows.len(),
            query.envelope,
            query.offset,
            query.limit
        );
        Ok(rows)
    }

    async fn fetch_envelope_meta(
        &self,
        user_id: &str,
        envelope: &str,
    ) -> Result<EnvelopeMeta, SourceError> {
        self.simulate_latency().await;
        Ok(self.meta(user_id, envelope).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetview_core::{normalize, FilterCriteria, TransactionType};
    use chrono::{TimeZone, Utc};

    const DATA: &str = r#"{
        "envelopes": [
            { "_id": "e1", "userId": "demo", "name": "Groceries" },
            { "_id": "e2", "userId": "demo", "name": "Rent" },
            { "_id": "e3", "userId": "other", "name": "Groceries" }
        ],
        "transactions": [
            { "userId": "demo", "envelope": "Groceries", "_id": "t1", "date": 1700000000000,
              "amount": 12.5, "type": "outgoing", "categories": ["food"], "currency": "USD" },
            { "userId": "demo", "envelope": "Groceries", "_id": "t2", "date": 1700086400000,
              "amount": 40, "type": "outgoing", "categories": ["food", "home"], "currency": "USD" },
            { "userId": "demo", "envelope": "Groceries", "_id": "t3", "date": 1699913600000,
              "amount": 100, "type": "income", "categories": ["refund"], "currency": "USD",
              "description": "Store refund" },
            { "userId": "demo", "envelope": "Rent", "_id": "t4", "date": 1700000000000,
              "amount": 900, "type": "outgoing", "categories": ["housing"], "currency": "EUR" },
            { "userId": "other", "envelope": "Groceries", "_id": "t5", "date": 1700000000000,
              "amount": 1, "type": "outgoing", "categories": ["food"], "currency": "USD" }
        ]
    }"#;

    fn query(envelope: &str, offset: usize, limit: usize, sort: SortSpec) -> QueryDescriptor {
        QueryDescriptor {
            user_id: "demo".to_string(),
            envelope: envelope.to_string(),
            limit,
            offset,
            sort,
            filter: Vec::new(),
        }
    }

    fn ids(rows: &[TransactionRecord]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_default_sort_is_newest_first() {
        let store = MemoryStore::from_json(DATA).unwrap();
        let rows = store
            .fetch_transaction_page(&query("Groceries", 0, 10, SortSpec::default()))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec!["t2", "t1", "t3"]);
    }

    #[tokio::test]
    async fn test_sort_by_amount_and_paging() {
        let store = MemoryStore::from_json(DATA).unwrap();
        let sort = SortSpec::new(ColumnId::Amount, SortDirection::Asc);

        let first = store.fetch_transaction_page(&query("Groceries", 0, 2, sort)).await.unwrap();
        assert_eq!(ids(&first), vec!["t1", "t2"]);

        let second = store.fetch_transaction_page(&query("Groceries", 2, 2, sort)).await.unwrap();
        assert_eq!(ids(&second), vec!["t3"]);

        let beyond = store.fetch_transaction_page(&query("Groceries", 10, 2, sort)).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_filter_applies_before_paging() {
        let store = MemoryStore::from_json(DATA).unwrap();
        let mut q = query("Groceries", 0, 10, SortSpec::default());
        q.filter = normalize(&FilterCriteria {
            categories: vec!["food".to_string()],
            ..FilterCriteria::default()
        });
        let rows = store.fetch_transaction_page(&q).await.unwrap();
        assert_eq!(ids(&rows), vec!["t2", "t1"]);

        q.filter = normalize(&FilterCriteria {
            kind: Some(TransactionType::Income),
            ..FilterCriteria::default()
        });
        let rows = store.fetch_transaction_page(&q).await.unwrap();
        assert_eq!(ids(&rows), vec!["t3"]);
    }

    #[tokio::test]
    async fn test_meta_counts_unfiltered_rows() {
        let store = MemoryStore::from_json(DATA).unwrap();
        let meta = store.fetch_envelope_meta("demo", "Groceries").await.unwrap();
        assert_eq!(meta.documents_count, 3);

        let meta = store.fetch_envelope_meta("other", "Groceries").await.unwrap();
        assert_eq!(meta.documents_count, 1);
    }

    #[tokio::test]
    async fn test_unknown_envelope() {
        let store = MemoryStore::from_json(DATA).unwrap();
        let err = store
            .fetch_transaction_page(&query("Travel", 0, 10, SortSpec::default()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Envelope not found: Travel");
        assert!(store.fetch_envelope_meta("demo", "Travel").await.is_err());
    }

    #[tokio::test]
    async fn test_envelopes_by_user() {
        let store = MemoryStore::from_json(DATA).unwrap();
        let names: Vec<String> = store.envelopes("demo").await.into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Groceries", "Rent"]);
        assert!(store.envelopes("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_create_and_delete() {
        let store = MemoryStore::from_json(DATA).unwrap();
        let created = store
            .create_transaction(
                "demo",
                "Rent",
                NewTransaction {
                    date: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
                    amount: 50.0,
                    kind: TransactionType::Outgoing,
                    categories: vec!["fees".to_string()],
                    currency: "EUR".to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(store.fetch_envelope_meta("demo", "Rent").await.unwrap().documents_count, 2);

        let removed = store.delete_transaction("demo", &created.id).await.unwrap();
        assert_eq!(removed.id, created.id);
        assert_eq!(store.fetch_envelope_meta("demo", "Rent").await.unwrap().documents_count, 1);

        assert!(matches!(
            store.delete_transaction("demo", &created.id).await,
            Err(StoreError::TransactionNotFound { .. })
        ));
        assert!(matches!(
            store.delete_transaction("demo", "t5").await,
            Err(StoreError::TransactionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_in_unknown_envelope() {
        let store = MemoryStore::from_json(DATA).unwrap();
        let result = store
            .create_transaction(
                "other",
                "Rent",
                NewTransaction {
                    date: Utc.timestamp_millis_opt(0).unwrap(),
                    amount: 1.0,
                    kind: TransactionType::Income,
                    categories: vec![],
                    currency: "USD".to_string(),
                    description: String::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::EnvelopeNotFound { .. })));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let data = r#"{
            "envelopes": [{ "_id": "e1", "userId": "demo", "name": "Groceries" }],
            "transactions": [
                { "userId": "demo", "envelope": "Groceries", "_id": "t1", "date": 0,
                  "amount": 1, "type": "income", "currency": "USD" },
                { "userId": "demo", "envelope": "Groceries", "_id": "t1", "date": 0,
                  "amount": 2, "type": "income", "currency": "USD" }
            ]
        }"#;
        assert!(matches!(
            MemoryStore::from_json(data),
            Err(StoreError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_out_of_range_date_rejected() {
        let data = r#"{
            "transactions": [
                { "userId": "demo", "envelope": "Groceries", "_id": "t1",
                  "date": 9223372036854775807, "amount": 1, "type": "income", "currency": "USD" }
            ]
        }"#;
        assert!(matches!(MemoryStore::from_json(data), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_ties_broken_by_id() {
        let at = Utc.timestamp_millis_opt(0).unwrap();
        let make = |id: &str| TransactionRecord {
            id: id.to_string(),
            date: at,
            amount: 1.0,
            kind: TransactionType::Income,
            categories: vec![],
            currency: "USD".to_string(),
            description: String::new(),
        };
        let sort = SortSpec::new(ColumnId::Date, SortDirection::Desc);
        assert_eq!(compare_records(&make("a"), &make("b"), &sort), Ordering::Less);
    }
}
