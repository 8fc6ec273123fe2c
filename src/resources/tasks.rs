//! Provider tasks: the asynchronous half of every create/delete call.
//!
//! Mutating operations answer with a task envelope (`{"tasks": ["<id>"]}`)
//! and the real work happens server-side. This module polls tasks to
//! completion, digs created resource IDs out of the finished task and
//! confirms deletions by treating a 404 on the resource as success.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::client::{ProviderClient, RequestOpts};
use crate::error::ApiError;
use crate::format::{format_output, CsvRecordProducer, Formattable, FormattingError, OutputFormat};
use crate::pagination::Pager;

/// Seconds between polls while waiting on a task.
pub const DEFAULT_POLL_INTERVAL: u64 = 2;

/// Envelope returned by create-style operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResults {
    pub tasks: Vec<String>,
}

impl TaskResults {
    /// The single task ID most operations schedule.
    pub fn first(&self) -> Option<&str> {
        self.tasks.first().map(String::as_str)
    }
}

impl CsvRecordProducer for TaskResults {
    fn csv_header() -> Vec<String> {
        vec!["TASK_ID".to_string()]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        self.tasks.iter().map(|id| vec![id.clone()]).collect()
    }
}

impl Formattable for TaskResults {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TaskState {
    New,
    Running,
    Finished,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub state: TaskState,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub created_resources: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CsvRecordProducer for Task {
    fn csv_header() -> Vec<String> {
        vec![
            "ID".to_string(),
            "STATE".to_string(),
            "TYPE".to_string(),
            "ERROR".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.id.clone(),
            self.state.to_string(),
            self.task_type.clone().unwrap_or_default(),
            self.error.clone().unwrap_or_default(),
        ]]
    }
}

impl Formattable for Task {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

impl Task {
    /// IDs of resources the finished task created under `key`, e.g.
    /// `"instances"` or `"volumes"`.
    pub fn created_resource_ids(&self, key: &str) -> Result<Vec<String>, ApiError> {
        self.created_resources
            .as_ref()
            .and_then(|resources| resources.get(key))
            .cloned()
            .ok_or_else(|| ApiError::TaskMissingResource {
                key: key.to_string(),
            })
    }
}

pub struct TasksService<'a> {
    client: &'a ProviderClient,
}

impl<'a> TasksService<'a> {
    pub fn new(client: &'a ProviderClient) -> Self {
        TasksService { client }
    }

    pub async fn get(&self, task_id: &str) -> Result<Task, ApiError> {
        let url = self.client.resource_url(&format!("v1/tasks/{}", task_id))?;
        let response = self.client.get(url, RequestOpts::default()).await?;
        response.extract_into()
    }

    pub async fn list_active(&self) -> Result<Vec<Task>, ApiError> {
        let url = self.client.resource_url("v1/tasks/active")?;
        Pager::new(self.client, url).all_pages().await
    }

    /// Poll a task until it reaches a terminal state. A task ending in
    /// `ERROR` is surfaced as [`ApiError::TaskFailed`].
    pub async fn wait_for_task(&self, task_id: &str) -> Result<Task, ApiError> {
        self.wait_for_task_with_interval(task_id, Duration::from_secs(DEFAULT_POLL_INTERVAL))
            .await
    }

    pub async fn wait_for_task_with_interval(
        &self,
        task_id: &str,
        interval: Duration,
    ) -> Result<Task, ApiError> {
        loop {
            let task = self.get(task_id).await?;
            trace!("task {} is {}", task.id, task.state);
            match task.state {
                TaskState::Finished => return Ok(task),
                TaskState::Error => {
                    return Err(ApiError::TaskFailed {
                        id: task.id.clone(),
                        message: task
                            .error
                            .unwrap_or_else(|| "task finished with an error".to_string()),
                    })
                }
                TaskState::New | TaskState::Running => {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    /// Confirm a deletion by polling the resource URL until it answers 404.
    /// The 404 is the success signal here; any other error is surfaced.
    pub async fn confirm_deleted(&self, resource_url: Url, interval: Duration) -> Result<(), ApiError> {
        loop {
            match self
                .client
                .get(resource_url.clone(), RequestOpts::default())
                .await
            {
                Ok(_) => {
                    debug!("resource at {} still present, waiting", resource_url);
                    tokio::time::sleep(interval).await;
                }
                Err(err) if err.is_not_found() => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }
}
