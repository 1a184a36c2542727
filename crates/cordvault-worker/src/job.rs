//! A single unit of scheduled work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A job handed to the [`JobExecutor`](crate::JobExecutor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Run identifier, for log correlation.
    pub id: Uuid,
    /// Selects the handler.
    pub job_type: String,
    /// Handler-specific arguments; `task` selects the operation.
    pub payload: Value,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a job of `job_type` running `task`.
    pub fn new(job_type: &str, task: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            job_type: job_type.to_string(),
            payload: serde_json::json!({ "task": task }),
            created_at: Utc::now(),
        }
    }

    /// Attach an extra payload field.
    pub fn with_arg(mut self, key: &str, value: Value) -> Self {
        if let Some(map) = self.payload.as_object_mut() {
            map.insert(key.to_string(), value);
        }
        self
    }

    /// The `task` field of the payload, or `""`.
    pub fn task(&self) -> &str {
        self.payload
            .get("task")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}
