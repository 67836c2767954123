//! Services for fetching, filtering and aggregating task data

pub mod aggregator;
pub mod api;
pub mod config;
pub mod filter;
pub mod monitor;

pub use aggregator::Aggregator;
pub use api::{DataQuery, HttpTaskService, TaskService};
pub use config::{Config, ThemeChoice};
pub use filter::FilterEngine;
pub use monitor::{MonitorEvent, MonitorState, Snapshot, TaskHandle, TaskMonitor};
