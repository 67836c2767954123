//! Sourcing task types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::dates;
use super::{Result, SalesboardError};

/// Lifecycle of a sourcing task on the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Completed and failed tasks never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a task currently in `self` may be observed as `next`.
    /// Once terminal, only the same status is accepted.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        !self.is_terminal() || self == next
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Progress bar fill while waiting on the task
    pub fn progress_percent(self) -> u16 {
        match self {
            Self::Pending => 30,
            Self::InProgress => 70,
            Self::Completed | Self::Failed => 100,
        }
    }
}

/// Where a record was sourced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    SourceA,
    SourceB,
}

impl DataSource {
    pub fn all() -> &'static [DataSource] {
        &[DataSource::SourceA, DataSource::SourceB]
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::SourceA => "source_a",
            Self::SourceB => "source_b",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SourceA => "Online Store (JSON)",
            Self::SourceB => "Physical Store (CSV)",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Self::SourceA => "Online",
            Self::SourceB => "Store",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "source_a" => Some(Self::SourceA),
            "source_b" => Some(Self::SourceB),
            _ => None,
        }
    }
}

/// Parameters a task was created with
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(
        default,
        deserialize_with = "dates::deserialize_opt_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year_from: Option<i32>,
    #[serde(
        default,
        deserialize_with = "dates::deserialize_opt_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year_to: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
}

/// A bounded background job that sources transaction records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub status: TaskStatus,
    #[serde(with = "dates")]
    pub created_at: NaiveDateTime,
    #[serde(with = "dates")]
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub filter_params: FilterParams,
}

impl Task {
    /// Fold a freshly fetched copy of this task into `self`.
    /// A terminal status is never replaced by a different one.
    /// Returns false when the update was rejected.
    pub fn merge(&mut self, fresh: Task) -> bool {
        if !self.status.can_transition_to(fresh.status) {
            log::warn!(
                "task {} reported {} after {}; keeping terminal status",
                self.id,
                fresh.status.label(),
                self.status.label()
            );
            return false;
        }
        *self = fresh;
        true
    }
}

/// Request body for creating a task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub name: String,
    pub filter_params: FilterParams,
}

impl NewTask {
    /// Reject specs the service would accept but never fulfil
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SalesboardError::Validation(
                "please enter a task name".into(),
            ));
        }
        if self.filter_params.data_sources.is_empty() {
            return Err(SalesboardError::Validation(
                "please select at least one data source".into(),
            ));
        }
        if let (Some(from), Some(to)) = (self.filter_params.year_from, self.filter_params.year_to) {
            if from > to {
                return Err(SalesboardError::Validation(format!(
                    "year_from {from} is after year_to {to}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_json(status: &str) -> String {
        format!(
            r#"{{
                "id": 7,
                "name": "Q2 electronics",
                "status": "{status}",
                "created_at": "2025-03-01T10:00:00.000123",
                "updated_at": "2025-03-01T10:05:00",
                "filter_params": {{
                    "year_from": "2020",
                    "year_to": 2025,
                    "categories": ["Electronics"],
                    "data_sources": ["source_a", "source_b"]
                }}
            }}"#
        )
    }

    #[test]
    fn test_task_deserialize() {
        let task: Task = serde_json::from_str(&task_json("in_progress")).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.filter_params.year_from, Some(2020));
        assert_eq!(task.filter_params.year_to, Some(2025));
        assert!(task.filter_params.companies.is_none());
        assert_eq!(
            task.filter_params.data_sources,
            vec![DataSource::SourceA, DataSource::SourceB]
        );
    }

    #[test]
    fn test_task_empty_filter_params() {
        let json = r#"{"id": 1, "status": "pending", "created_at": "2025-01-01",
                       "updated_at": "2025-01-01", "filter_params": {}}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.filter_params, FilterParams::default());
        assert!(task.name.is_empty());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_no_transition_out_of_terminal() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Failed));
        assert!(TaskStatus::Completed.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn test_merge_rejects_backward_status() {
        let mut task: Task = serde_json::from_str(&task_json("completed")).unwrap();
        let stale: Task = serde_json::from_str(&task_json("pending")).unwrap();
        assert!(!task.merge(stale));
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn test_merge_accepts_forward_status() {
        let mut task: Task = serde_json::from_str(&task_json("pending")).unwrap();
        let fresh: Task = serde_json::from_str(&task_json("completed")).unwrap();
        assert!(task.merge(fresh));
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(TaskStatus::Pending.progress_percent(), 30);
        assert_eq!(TaskStatus::InProgress.progress_percent(), 70);
        assert_eq!(TaskStatus::Completed.progress_percent(), 100);
    }

    // ========== NewTask validation ==========

    fn new_task(name: &str, sources: Vec<DataSource>) -> NewTask {
        NewTask {
            name: name.to_string(),
            filter_params: FilterParams {
                year_from: Some(2020),
                year_to: Some(2025),
                data_sources: sources,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(new_task("Books", vec![DataSource::SourceA]).validate().is_ok());
    }

    #[test]
    fn test_validate_blank_name() {
        let err = new_task("   ", vec![DataSource::SourceA]).validate().unwrap_err();
        assert!(err.to_string().contains("task name"));
    }

    #[test]
    fn test_validate_no_sources() {
        let err = new_task("Books", vec![]).validate().unwrap_err();
        assert!(err.to_string().contains("data source"));
    }

    #[test]
    fn test_validate_inverted_years() {
        let mut spec = new_task("Books", vec![DataSource::SourceB]);
        spec.filter_params.year_from = Some(2026);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_new_task_serializes_without_empty_options() {
        let json = serde_json::to_value(new_task("x", vec![DataSource::SourceB])).unwrap();
        let params = &json["filter_params"];
        assert!(params.get("companies").is_none());
        assert_eq!(params["data_sources"][0], "source_b");
        assert_eq!(params["year_from"], 2020);
    }
}
