use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::JobStatus;
use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::shared::schema::jobs;
use crate::core::shared::utils::new_id;
use crate::core::shared::validate::{self, Changes, Validate};

/// A queued unit of background work. Rows are stored and queried here; the
/// worker that runs them lives elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = jobs)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub payload_json: String,
    pub status: JobStatus,
    pub attempts: i32,
    pub error: Option<String>,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn payload(&self) -> StoreResult<serde_json::Value> {
        serde_json::from_str(&self.payload_json)
            .map_err(|e| StoreError::validation(format!("payloadJson is not valid JSON: {e}")))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = jobs)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub payload_json: String,
    pub status: JobStatus,
    pub attempts: i32,
    pub error: Option<String>,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewJob {
    pub fn new(job_type: impl Into<String>, payload: &serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            job_type: job_type.into(),
            payload_json: payload.to_string(),
            status: JobStatus::default(),
            attempts: 0,
            error: None,
            next_retry_at: None,
            scheduled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }
}

impl Validate for NewJob {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("type", &self.job_type)?;
        validate::json_text("payloadJson", &self.payload_json)?;
        validate::non_negative("attempts", self.attempts)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = jobs)]
#[serde(rename_all = "camelCase", default)]
pub struct JobUpdate {
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub payload_json: Option<String>,
    pub status: Option<JobStatus>,
    pub attempts: Option<i32>,
    pub error: Option<Option<String>>,
    pub next_retry_at: Option<Option<DateTime<Utc>>>,
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Marks a failed attempt and when the next one may run.
    pub fn failed_attempt(
        attempts: i32,
        error: impl Into<String>,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            status: Some(if next_retry_at.is_some() {
                JobStatus::Pending
            } else {
                JobStatus::Failed
            }),
            attempts: Some(attempts),
            error: Some(Some(error.into())),
            next_retry_at: Some(next_retry_at),
            ..Default::default()
        }
    }
}

impl Validate for JobUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.job_type, |v| validate::non_empty("type", v))?;
        validate::optional(&self.payload_json, |v| validate::json_text("payloadJson", v))?;
        validate::optional(&self.attempts, |v| validate::non_negative("attempts", *v))
    }
}

impl Changes for JobUpdate {
    fn is_empty(&self) -> bool {
        self.job_type.is_none()
            && self.payload_json.is_none()
            && self.status.is_none()
            && self.attempts.is_none()
            && self.error.is_none()
            && self.next_retry_at.is_none()
            && self.scheduled_at.is_none()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}
