//! Aggregator service for computing chart views
//!
//! Every reducer is a pure function of the filtered records; callers
//! recompute all views whenever the record set or the filter changes.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::types::{
    CategoryAggregate, ChartData, DataSource, DataSummary, NormalizedMetrics, Platform,
    PlatformAggregate, TimeSeriesPoint, TransactionRecord,
};

/// Aggregator for computing sales rollups
pub struct Aggregator;

#[derive(Default)]
struct PlatformAcc {
    total_sales: f64,
    total_items: u64,
    order_count: u64,
}

impl Aggregator {
    /// Sales per calendar month (sorted by month ascending)
    pub fn time_series<R: Borrow<TransactionRecord>>(records: &[R]) -> Vec<TimeSeriesPoint> {
        let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();

        for record in records {
            let record = record.borrow();
            *by_month.entry(record.month_start()).or_insert(0.0) += record.line_total();
        }

        by_month
            .into_iter()
            .map(|(month, total_sales)| TimeSeriesPoint { month, total_sales })
            .collect()
    }

    /// Sales per category, largest first.
    /// Equal totals keep the order in which the categories first appeared.
    pub fn by_category<R: Borrow<TransactionRecord>>(records: &[R]) -> Vec<CategoryAggregate> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut result: Vec<CategoryAggregate> = Vec::new();

        for record in records {
            let record = record.borrow();
            let slot = *index.entry(record.category.as_str()).or_insert_with(|| {
                result.push(CategoryAggregate {
                    category: record.category.clone(),
                    total_sales: 0.0,
                });
                result.len() - 1
            });
            result[slot].total_sales += record.line_total();
        }

        // sort_by is stable
        result.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
        result
    }

    /// Per-platform metrics, always covering the canonical platform set
    /// and sorted by platform name. Each metric is also normalized against
    /// its cross-platform maximum (floored at 1).
    pub fn by_platform<R: Borrow<TransactionRecord>>(records: &[R]) -> Vec<PlatformAggregate> {
        let mut groups: BTreeMap<Platform, PlatformAcc> = BTreeMap::new();

        for record in records {
            let record = record.borrow();
            let acc = groups.entry(record.platform).or_default();
            acc.total_sales += record.line_total();
            acc.total_items = acc.total_items.saturating_add(u64::from(record.quantity));
            acc.order_count = acc.order_count.saturating_add(1);
        }

        let mut result: Vec<PlatformAggregate> = groups
            .into_iter()
            .map(|(platform, acc)| PlatformAggregate {
                platform,
                total_sales: acc.total_sales,
                avg_order_value: if acc.order_count > 0 {
                    acc.total_sales / acc.order_count as f64
                } else {
                    0.0
                },
                total_items: acc.total_items,
                order_count: acc.order_count,
                normalized: NormalizedMetrics::default(),
            })
            .collect();

        for platform in Platform::all() {
            if !result.iter().any(|p| p.platform == *platform) {
                result.push(PlatformAggregate::empty(*platform));
            }
        }
        result.sort_by_key(|p| p.platform.as_str());

        let max_of = |f: fn(&PlatformAggregate) -> f64| -> f64 {
            result.iter().map(f).fold(1.0_f64, f64::max)
        };
        let max_sales = max_of(|p| p.total_sales);
        let max_avg = max_of(|p| p.avg_order_value);
        let max_items = max_of(|p| p.total_items as f64);
        let max_orders = max_of(|p| p.order_count as f64);

        for p in &mut result {
            p.normalized = NormalizedMetrics {
                total_sales: p.total_sales / max_sales,
                avg_order_value: p.avg_order_value / max_avg,
                total_items: p.total_items as f64 / max_items,
                order_count: p.order_count as f64 / max_orders,
            };
        }

        result
    }

    /// Record counts per source and total value
    pub fn summary<R: Borrow<TransactionRecord>>(records: &[R]) -> DataSummary {
        let mut summary = DataSummary::default();
        for record in records {
            let record = record.borrow();
            summary.record_count += 1;
            match record.source {
                DataSource::SourceA => summary.online_store_records += 1,
                DataSource::SourceB => summary.physical_store_records += 1,
            }
            summary.total_value += record.line_total();
        }
        summary
    }

    /// Compute every view from one filtered set
    pub fn chart_data<R: Borrow<TransactionRecord>>(records: &[R]) -> ChartData {
        ChartData {
            time_series: Self::time_series(records),
            categories: Self::by_category(records),
            platforms: Self::by_platform(records),
            summary: Self::summary(records),
        }
    }
}
