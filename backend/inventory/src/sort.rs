use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use stockscan_core::{Item, ItemField, StockError};

/// Column an inventory listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Timestamp,
    Field(ItemField),
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Timestamp => f.write_str("timestamp"),
            SortKey::Field(field) => field.fmt(f),
        }
    }
}

impl FromStr for SortKey {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp" | "date" | "added" => Ok(SortKey::Timestamp),
            other => other.parse().map(SortKey::Field),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort order of a listing. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Timestamp,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Clicking a column: the current ascending column flips to descending,
    /// anything else sorts ascending by `key`.
    pub fn toggle(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { key, direction }
    }

    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let ord = match self.key {
            SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
            SortKey::Field(ItemField::Quantity) => a.quantity.cmp(&b.quantity),
            SortKey::Field(field) => a.field(field).cmp(&b.field(field)),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }

    /// Stable in both directions.
    pub fn sort(&self, items: &mut [Item]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}
