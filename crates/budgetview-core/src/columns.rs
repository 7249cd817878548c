//! Column registry for the transaction table
//!
//! The displayed columns are a closed set. Each column reads one typed
//! [`FieldValue`] out of a record, and formatting is an exhaustive match over
//! those values, so there is no column a formatter cannot handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{TransactionRecord, TransactionType};

/// Record field shown as a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnId {
    Date,
    Amount,
    Type,
    Categories,
    Currency,
    Description,
}

impl ColumnId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Date => "date",
            ColumnId::Amount => "amount",
            ColumnId::Type => "type",
            ColumnId::Categories => "categories",
            ColumnId::Currency => "currency",
            ColumnId::Description => "description",
        }
    }
}

impl std::str::FromStr for ColumnId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(ColumnId::Date),
            "amount" => Ok(ColumnId::Amount),
            "type" => Ok(ColumnId::Type),
            "categories" => Ok(ColumnId::Categories),
            "currency" => Ok(ColumnId::Currency),
            "description" => Ok(ColumnId::Description),
            _ => Err(CoreError::UnknownColumn {
                name: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw value of one record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Date(DateTime<Utc>),
    Amount(f64),
    Type(TransactionType),
    Categories(Vec<String>),
    Currency(String),
    Description(String),
}

impl FieldValue {
    /// Read a field from a record
    pub fn of(record: &TransactionRecord, column: ColumnId) -> Self {
        match column {
            ColumnId::Date => FieldValue::Date(record.date),
            ColumnId::Amount => FieldValue::Amount(record.amount),
            ColumnId::Type => FieldValue::Type(record.kind),
            ColumnId::Categories => FieldValue::Categories(record.categories.clone()),
            ColumnId::Currency => FieldValue::Currency(record.currency.clone()),
            ColumnId::Description => FieldValue::Description(record.description.clone()),
        }
    }

    /// Display form of the value
    pub fn formatted(&self) -> CellValue {
        match self {
            FieldValue::Date(date) => CellValue::text(date.format("%Y-%m-%d").to_string()),
            FieldValue::Amount(amount) => CellValue::text(format!("{:.2}", amount)),
            FieldValue::Type(kind) => CellValue::Badge {
                label: kind.to_string(),
                tone: if kind.is_income() { Tone::Success } else { Tone::Error },
            },
            FieldValue::Categories(categories) => CellValue::text(categories.join(", ")),
            FieldValue::Currency(text) | FieldValue::Description(text) => CellValue::text(text.clone()),
        }
    }

    /// The value as it came from the source
    pub fn raw(&self) -> CellValue {
        match self {
            FieldValue::Date(date) => CellValue::text(date.timestamp_millis().to_string()),
            FieldValue::Amount(amount) => CellValue::text(amount.to_string()),
            FieldValue::Type(kind) => CellValue::text(kind.to_string()),
            FieldValue::Categories(categories) => CellValue::text(categories.join(",")),
            FieldValue::Currency(text) | FieldValue::Description(text) => CellValue::text(text.clone()),
        }
    }
}

/// Color of a badge cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Error,
}

/// Rendered content of a table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CellValue {
    Text { text: String },
    Badge { label: String, tone: Tone },
}

impl CellValue {
    pub fn text(text: impl Into<String>) -> Self {
        CellValue::Text { text: text.into() }
    }

    /// Visible text of the cell
    pub fn label(&self) -> &str {
        match self {
            CellValue::Text { text } => text,
            CellValue::Badge { label, .. } => label,
        }
    }
}

/// Static description of one table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub id: ColumnId,
    pub label: &'static str,
    /// Render through [`FieldValue::formatted`] instead of the raw value
    pub formatted: bool,
}

impl ColumnDescriptor {
    /// Cell content for a record in this column
    pub fn cell(&self, record: &TransactionRecord) -> CellValue {
        let value = FieldValue::of(record, self.id);
        if self.formatted {
            value.formatted()
        } else {
            value.raw()
        }
    }
}

/// Columns of the transaction table, in display order
pub const COLUMNS: [ColumnDescriptor; 6] = [
    ColumnDescriptor { id: ColumnId::Date, label: "Date", formatted: true },
    ColumnDescriptor { id: ColumnId::Amount, label: "Amount", formatted: true },
    ColumnDescriptor { id: ColumnId::Type, label: "Type", formatted: true },
    ColumnDescriptor { id: ColumnId::Categories, label: "Categories", formatted: true },
    ColumnDescriptor { id: ColumnId::Currency, label: "Currency", formatted: false },
    ColumnDescriptor { id: ColumnId::Description, label: "Description", formatted: false },
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> TransactionRecord {
        TransactionRecord {
            id: "t1".to_string(),
            date: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            amount: 1234.5,
            kind: TransactionType::Outgoing,
            categories: vec!["food".to_string(), "travel".to_string()],
            currency: "EUR".to_string(),
            description: "Lunch <downtown>".to_string(),
        }
    }

    #[test]
    fn test_column_order_and_labels() {
        let ids: Vec<&str> = COLUMNS.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["date", "amount", "type", "categories", "currency", "description"]);
        assert_eq!(COLUMNS[3].label, "Categories");
    }

    #[test]
    fn test_column_from_str() {
        assert_eq!("Amount".parse::<ColumnId>().unwrap(), ColumnId::Amount);
        assert!(matches!(
            "payee".parse::<ColumnId>(),
            Err(CoreError::UnknownColumn { ref name }) if name == "payee"
        ));
    }

    #[test]
    fn test_formatted_cells() {
        let record = record();
        let cells: Vec<CellValue> = COLUMNS.iter().map(|c| c.cell(&record)).collect();

        assert_eq!(cells[0], CellValue::text("2023-11-14"));
        assert_eq!(cells[1], CellValue::text("1234.50"));
        assert_eq!(
            cells[2],
            CellValue::Badge { label: "outgoing".to_string(), tone: Tone::Error }
        );
        assert_eq!(cells[3], CellValue::text("food, travel"));
        assert_eq!(cells[4], CellValue::text("EUR"));
        assert_eq!(cells[5], CellValue::text("Lunch <downtown>"));
    }

    #[test]
    fn test_income_badge_tone() {
        let mut record = record();
        record.kind = TransactionType::Income;
        assert_eq!(
            COLUMNS[2].cell(&record),
            CellValue::Badge { label: "income".to_string(), tone: Tone::Success }
        );
    }

    #[test]
    fn test_formatters_total_at_extremes() {
        let mut record = record();
        record.amount = -5.0;
        record.categories.clear();
        record.date = DateTime::<Utc>::MIN_UTC;

        for column in COLUMNS.iter() {
            let cell = column.cell(&record);
            if column.id == ColumnId::Categories {
                assert_eq!(cell.label(), "");
            }
        }
        assert_eq!(COLUMNS[1].cell(&record).label(), "-5.00");
    }

    #[test]
    fn test_unformatted_column_uses_raw_value() {
        let column = ColumnDescriptor { id: ColumnId::Date, label: "Date", formatted: false };
        assert_eq!(column.cell(&record()).label(), "1700000000000");
    }

    #[test]
    fn test_cell_serialization() {
        let json = serde_json::to_value(CellValue::text("x")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "text", "text": "x"}));
    }
}
