//! Sort specification for the transaction table

use budgetview_config::SortOrder;
use serde::{Deserialize, Serialize};

use crate::columns::ColumnId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl From<SortOrder> for SortDirection {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => SortDirection::Asc,
            SortOrder::Desc => SortDirection::Desc,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// The single active sort column and its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: ColumnId,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: ColumnId::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub fn new(field: ColumnId, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Sort after a click on `field`'s header.
    ///
    /// Clicking the active column flips its direction; any other column
    /// becomes active in ascending order.
    pub fn toggled(&self, field: ColumnId) -> Self {
        if self.field == field {
            Self::new(field, self.direction.reversed())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }

    /// Direction a header should show for `field`
    pub fn direction_for(&self, field: ColumnId) -> SortDirection {
        if self.field == field {
            self.direction
        } else {
            SortDirection::Asc
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_date_desc() {
        let sort = SortSpec::default();
        assert_eq!(sort.field, ColumnId::Date);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_toggle_same_field_flips_then_new_field_resets() {
        let sort = SortSpec::default();

        let sort = sort.toggled(ColumnId::Amount);
        assert_eq!(sort, SortSpec::new(ColumnId::Amount, SortDirection::Asc));

        let sort = sort.toggled(ColumnId::Amount);
        assert_eq!(sort, SortSpec::new(ColumnId::Amount, SortDirection::Desc));

        let sort = sort.toggled(ColumnId::Date);
        assert_eq!(sort, SortSpec::new(ColumnId::Date, SortDirection::Asc));
    }

    #[test]
    fn test_toggle_active_desc_goes_asc() {
        let sort = SortSpec::default().toggled(ColumnId::Date);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_direction_for_inactive_column() {
        let sort = SortSpec::new(ColumnId::Amount, SortDirection::Desc);
        assert_eq!(sort.direction_for(ColumnId::Amount), SortDirection::Desc);
        assert_eq!(sort.direction_for(ColumnId::Type), SortDirection::Asc);
    }

    #[test]
    fn test_from_config_order() {
        assert_eq!(SortDirection::from(SortOrder::Asc), SortDirection::Asc);
        assert_eq!(SortDirection::from(SortOrder::Desc), SortDirection::Desc);
    }
}
