//! Transaction and envelope data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of money flow for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TransactionType {
    /// Money coming into the envelope
    Income,
    /// Everything else (spending, transfers out)
    Outgoing,
}

impl TransactionType {
    pub fn is_income(&self) -> bool {
        matches!(self, TransactionType::Income)
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        match label.as_str() {
            "" => Err("Transaction type must not be empty".to_string()),
            "income" => Ok(TransactionType::Income),
            _ => Ok(TransactionType::Outgoing),
        }
    }
}

impl TryFrom<String> for TransactionType {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Outgoing => write!(f, "outgoing"),
        }
    }
}

/// A transaction as returned by the source.
///
/// Dates travel as integer milliseconds. A timestamp outside the calendar
/// range fails to decode, so every decoded record has a printable date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub categories: Vec<String>,
    pub currency: String,
    #[serde(default)]
    pub description: String,
}

impl TransactionRecord {
    /// Whether the record carries the given category
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// Payload for creating a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub categories: Vec<String>,
    pub currency: String,
    #[serde(default)]
    pub description: String,
}

impl NewTransaction {
    /// Attach an identifier, producing the stored record
    pub fn into_record(self, id: String) -> TransactionRecord {
        TransactionRecord {
            id,
            date: self.date,
            amount: self.amount,
            kind: self.kind,
            categories: self.categories,
            currency: self.currency,
            description: self.description,
        }
    }
}

/// A budget envelope owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(alias = "_id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
}

/// Envelope totals, fetched separately from the paged rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMeta {
    pub documents_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("Income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("outgoing".parse::<TransactionType>().unwrap(), TransactionType::Outgoing);
        assert_eq!("expense".parse::<TransactionType>().unwrap(), TransactionType::Outgoing);
        assert!("".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_record_decodes_wire_format() {
        let json = r#"{
            "_id": "t1",
            "date": 1700000000000,
            "amount": 12.5,
            "type": "income",
            "categories": ["salary"],
            "currency": "USD",
            "description": "Paycheck"
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "t1");
        assert_eq!(record.date.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(record.kind, TransactionType::Income);
        assert!(record.has_category("salary"));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["date"], 1_700_000_000_000i64);
        assert_eq!(back["type"], "income");
        assert_eq!(back["id"], "t1");
    }

    #[test]
    fn test_record_rejects_unrepresentable_date() {
        let json = r#"{"id":"t","date":9223372036854775807,"amount":1,"type":"income","currency":"USD"}"#;
        assert!(serde_json::from_str::<TransactionRecord>(json).is_err());
    }

    #[test]
    fn test_record_rejects_empty_type() {
        let json = r#"{"id":"t","date":0,"amount":1,"type":"","currency":"USD"}"#;
        assert!(serde_json::from_str::<TransactionRecord>(json).is_err());
    }

    #[test]
    fn test_envelope_meta_wire_name() {
        let meta: EnvelopeMeta = serde_json::from_str(r#"{"documentsCount": 25}"#).unwrap();
        assert_eq!(meta.documents_count, 25);
    }
}
