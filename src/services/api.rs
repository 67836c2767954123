//! Task service client
//!
//! Thin JSON-over-HTTP wrapper around the remote sourcing service.
//! `TaskService` is the seam the monitor depends on, so tests can swap
//! in an in-memory service.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::types::{NewTask, Result, SalesboardError, Task, TaskData};

/// Server-side narrowing accepted by the task data endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataQuery {
    pub company: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

impl DataQuery {
    /// Query pairs for the non-empty fields only
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(company) = self.company.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("company", company.to_string()));
        }
        if let Some(year) = self.year_from {
            pairs.push(("year_from", year.to_string()));
        }
        if let Some(year) = self.year_to {
            pairs.push(("year_to", year.to_string()));
        }
        pairs
    }
}

/// Operations consumed from the remote task service
pub trait TaskService: Send + Sync + 'static {
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn get_task(&self, id: u64) -> impl Future<Output = Result<Task>> + Send;

    fn create_task(&self, spec: &NewTask) -> impl Future<Output = Result<Task>> + Send;

    fn get_task_data(
        &self,
        id: u64,
        query: &DataQuery,
    ) -> impl Future<Output = Result<TaskData>> + Send;
}

/// reqwest-backed implementation
pub struct HttpTaskService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskService {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, id: u64) -> String {
        format!("{}/tasks/{}", self.base_url, id)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(SalesboardError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl TaskService for HttpTaskService {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let url = self.tasks_url();
        log::debug!("GET {url}");
        Self::decode(self.client.get(&url).send().await?).await
    }

    async fn get_task(&self, id: u64) -> Result<Task> {
        let url = self.task_url(id);
        log::debug!("GET {url}");
        Self::decode(self.client.get(&url).send().await?).await
    }

    async fn create_task(&self, spec: &NewTask) -> Result<Task> {
        spec.validate()?;
        let url = self.tasks_url();
        log::info!("creating task {:?}", spec.name);
        Self::decode(self.client.post(&url).json(spec).send().await?).await
    }

    async fn get_task_data(&self, id: u64, query: &DataQuery) -> Result<TaskData> {
        let url = format!("{}/data", self.task_url(id));
        log::debug!("GET {url} {:?}", query);
        let request = self.client.get(&url).query(&query.to_pairs());
        let data: TaskData = Self::decode(request.send().await?).await?;
        log::info!("task {id}: fetched {} records", data.data.len());
        Ok(data)
    }
}
