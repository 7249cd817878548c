//! Filter criteria and their normalized constraint list
//!
//! The filter form produces sparse [`FilterCriteria`]. Before a query is built
//! they are normalized into [`FilterConstraint`]s, one per field that actually
//! restricts something, in the order date, categories, type.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{TransactionRecord, TransactionType};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Values currently entered in the filter form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionType>,
}

impl FilterCriteria {
    /// Parse raw form fields.
    ///
    /// `date` is `YYYY-MM-DD` (midnight UTC) or integer milliseconds,
    /// `categories` is comma separated. Empty fields mean "no constraint".
    pub fn from_form(date: &str, categories: &str, kind: &str) -> CoreResult<Self> {
        let date = parse_date(date)?;

        let mut parsed: Vec<String> = Vec::new();
        for category in categories.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            if !parsed.iter().any(|c| c == category) {
                parsed.push(category.to_string());
            }
        }

        let kind = if kind.trim().is_empty() {
            None
        } else {
            Some(
                kind.parse::<TransactionType>()
                    .map_err(|message| CoreError::InvalidFilter { message })?,
            )
        };

        Ok(Self {
            date,
            categories: parsed,
            kind,
        })
    }

    pub fn is_empty(&self) -> bool {
        normalize(self).is_empty()
    }
}

fn parse_date(input: &str) -> CoreResult<Option<DateTime<Utc>>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    if let Ok(millis) = input.parse::<i64>() {
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .map(Some)
            .ok_or_else(|| CoreError::InvalidFilter {
                message: format!("Timestamp out of range: {}", millis),
            });
    }

    let day = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| CoreError::InvalidFilter {
        message: format!("Invalid date '{}'", input),
    })?;
    let midnight = day.and_hms_opt(0, 0, 0).ok_or_else(|| CoreError::InvalidFilter {
        message: format!("Invalid date '{}'", input),
    })?;
    Ok(Some(Utc.from_utc_datetime(&midnight)))
}

/// Field a constraint applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Date,
    Categories,
    Type,
}

/// Constraint value, already in wire form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Start of the day, in milliseconds
    Timestamp(i64),
    Categories(Vec<String>),
    Type(TransactionType),
}

/// A single `(field, value)` restriction applied by the source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterConstraint {
    pub field: FilterField,
    pub value: FilterValue,
}

impl FilterConstraint {
    /// Whether a record satisfies this constraint.
    ///
    /// Dates match on the UTC day starting at the timestamp; categories
    /// match when the record has any of them. A value of the wrong shape for
    /// its field matches nothing.
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        match (self.field, &self.value) {
            (FilterField::Date, FilterValue::Timestamp(start)) => {
                let at = record.date.timestamp_millis();
                at >= *start && at < start.saturating_add(DAY_MILLIS)
            }
            (FilterField::Categories, FilterValue::Categories(categories)) => {
                categories.iter().any(|c| record.has_category(c))
            }
            (FilterField::Type, FilterValue::Type(kind)) => record.kind == *kind,
            _ => false,
        }
    }
}

/// Convert criteria into the constraint list sent with a query.
///
/// Only fields with a value are kept; an empty result means no filtering.
pub fn normalize(criteria: &FilterCriteria) -> Vec<FilterConstraint> {
    let mut constraints = Vec::with_capacity(3);

    if let Some(date) = criteria.date {
        constraints.push(FilterConstraint {
            field: FilterField::Date,
            value: FilterValue::Timestamp(date.timestamp_millis()),
        });
    }

    if !criteria.categories.is_empty() {
        constraints.push(FilterConstraint {
            field: FilterField::Categories,
            value: FilterValue::Categories(criteria.categories.clone()),
        });
    }

    if let Some(kind) = criteria.kind {
        constraints.push(FilterConstraint {
            field: FilterField::Type,
            value: FilterValue::Type(kind),
        });
    }

    constraints
}

/// Whether a record satisfies every constraint
pub fn matches_all(constraints: &[FilterConstraint], record: &TransactionRecord) -> bool {
    constraints.iter().all(|c| c.matches(record))
}
