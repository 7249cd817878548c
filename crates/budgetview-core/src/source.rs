//! Transaction source interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::SourceError;
use crate::filter::FilterConstraint;
use crate::models::{EnvelopeMeta, TransactionRecord};
use crate::sort::SortSpec;

/// Everything a source needs to produce one page of an envelope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub user_id: String,
    pub envelope: String,
    pub limit: usize,
    pub offset: usize,
    pub sort: SortSpec,
    pub filter: Vec<FilterConstraint>,
}

/// Source reference type
pub type SourceRef = Arc<dyn TransactionSource>;

/// Remote provider of envelope transactions
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetch one sorted, filtered page of an envelope's transactions
    async fn fetch_transaction_page(
        &self,
        query: &QueryDescriptor,
    ) -> Result<Vec<TransactionRecord>, SourceError>;

    /// Fetch envelope totals
    async fn fetch_envelope_meta(
        &self,
        user_id: &str,
        envelope: &str,
    ) -> Result<EnvelopeMeta, SourceError>;
}
