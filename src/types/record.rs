//! Transaction record and filter selection types

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::dates;
use super::DataSource;

/// Known product categories offered by the category filter
pub const PRODUCT_CATEGORIES: [&str; 7] = [
    "Electronics",
    "Clothing",
    "Home & Kitchen",
    "Beauty",
    "Books",
    "Sports",
    "Toys",
];

/// Years offered by the year filter
pub const FILTER_YEARS: std::ops::RangeInclusive<i32> = 2020..=2025;

/// Sales channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    Online,
    Store,
}

impl Platform {
    /// Canonical platform set, in name order
    pub fn all() -> &'static [Platform] {
        &[Platform::Online, Platform::Store]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Store => "Store",
        }
    }

    /// Human label used by the filter bar
    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Store => "Physical Store",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Some(Self::Online),
            "store" | "physical store" => Some(Self::Store),
            _ => None,
        }
    }
}

/// A single sourced sale. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub source: DataSource,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub platform: Platform,
    #[serde(with = "dates")]
    pub purchase_date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl TransactionRecord {
    /// price × quantity
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    pub fn year(&self) -> i32 {
        self.purchase_date.year()
    }

    /// Purchase date truncated to the first day of its month
    pub fn month_start(&self) -> NaiveDate {
        let date = self.purchase_date.date();
        date.with_day(1).unwrap_or(date)
    }
}

/// Payload of the task data endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub data: Vec<TransactionRecord>,
}

/// Active filter selection. `None` (or an empty string) matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub platform: Option<Platform>,
    pub year: Option<i32>,
}

impl FilterState {
    pub fn is_wildcard(&self) -> bool {
        active(&self.category).is_none()
            && active(&self.brand).is_none()
            && self.platform.is_none()
            && self.year.is_none()
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if let Some(category) = active(&self.category) {
            if record.category != category {
                return false;
            }
        }
        if let Some(brand) = active(&self.brand) {
            if record.brand != brand {
                return false;
            }
        }
        if let Some(platform) = self.platform {
            if record.platform != platform {
                return false;
            }
        }
        if let Some(year) = self.year {
            if record.year() != year {
                return false;
            }
        }
        true
    }
}

fn active(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
