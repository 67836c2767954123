//! Derived aggregate views over a filtered record set

use chrono::NaiveDate;
use serde::Serialize;

use super::Platform;

/// Sales total for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// First day of the month
    pub month: NaiveDate,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    pub category: String,
    pub total_sales: f64,
}

/// Metrics compared across platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformMetric {
    TotalSales,
    AvgOrderValue,
    TotalItems,
    OrderCount,
}

impl PlatformMetric {
    pub fn all() -> &'static [PlatformMetric] {
        &[
            PlatformMetric::TotalSales,
            PlatformMetric::AvgOrderValue,
            PlatformMetric::TotalItems,
            PlatformMetric::OrderCount,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TotalSales => "Total Sales",
            Self::AvgOrderValue => "Avg Order Value",
            Self::TotalItems => "Items Sold",
            Self::OrderCount => "Order Count",
        }
    }
}

/// Each metric divided by its cross-platform maximum (0..=1)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMetrics {
    pub total_sales: f64,
    pub avg_order_value: f64,
    pub total_items: f64,
    pub order_count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAggregate {
    pub platform: Platform,
    pub total_sales: f64,
    pub avg_order_value: f64,
    pub total_items: u64,
    pub order_count: u64,
    pub normalized: NormalizedMetrics,
}

impl PlatformAggregate {
    /// Zero-valued entry for a platform absent from the input
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            total_sales: 0.0,
            avg_order_value: 0.0,
            total_items: 0,
            order_count: 0,
            normalized: NormalizedMetrics::default(),
        }
    }

    pub fn raw(&self, metric: PlatformMetric) -> f64 {
        match metric {
            PlatformMetric::TotalSales => self.total_sales,
            PlatformMetric::AvgOrderValue => self.avg_order_value,
            PlatformMetric::TotalItems => self.total_items as f64,
            PlatformMetric::OrderCount => self.order_count as f64,
        }
    }

    pub fn normalized(&self, metric: PlatformMetric) -> f64 {
        match metric {
            PlatformMetric::TotalSales => self.normalized.total_sales,
            PlatformMetric::AvgOrderValue => self.normalized.avg_order_value,
            PlatformMetric::TotalItems => self.normalized.total_items,
            PlatformMetric::OrderCount => self.normalized.order_count,
        }
    }
}

/// Headline numbers for the filtered set
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSummary {
    pub record_count: usize,
    pub online_store_records: usize,
    pub physical_store_records: usize,
    pub total_value: f64,
}

/// All three chart views, recomputed together from one filtered set
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub time_series: Vec<TimeSeriesPoint>,
    pub categories: Vec<CategoryAggregate>,
    pub platforms: Vec<PlatformAggregate>,
    pub summary: DataSummary,
}
