use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::ProjectStatus;
use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::shared::schema::{clip_candidates, projects, transcripts};
use crate::core::shared::utils::new_id;
use crate::core::shared::validate::{self, Changes, Validate};

fn parse_json(field: &str, value: &str) -> StoreResult<serde_json::Value> {
    serde_json::from_str(value)
        .map_err(|e| StoreError::validation(format!("{field} is not valid JSON: {e}")))
}

// ============================================================================
// PROJECT
// ============================================================================

/// An imported source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = projects)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub source_path: String,
    pub duration_ms: Option<i32>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = projects)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub id: String,
    pub title: String,
    pub source_path: String,
    pub duration_ms: Option<i32>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewProject {
    pub fn new(title: impl Into<String>, source_path: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            source_path: source_path.into(),
            duration_ms: None,
            status: ProjectStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: i32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }
}

impl Validate for NewProject {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("id", &self.id)?;
        validate::non_empty("title", &self.title)?;
        validate::non_empty("sourcePath", &self.source_path)?;
        validate::optional(&self.duration_ms, |v| validate::non_negative("durationMs", *v))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = projects)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub source_path: Option<String>,
    pub duration_ms: Option<Option<i32>>,
    pub status: Option<ProjectStatus>,
    /// Stamped on every non-empty update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProjectUpdate {
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Validate for ProjectUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.title, |v| validate::non_empty("title", v))?;
        validate::optional(&self.source_path, |v| validate::non_empty("sourcePath", v))?;
        if let Some(Some(duration_ms)) = self.duration_ms {
            validate::non_negative("durationMs", duration_ms)?;
        }
        Ok(())
    }
}

impl Changes for ProjectUpdate {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.source_path.is_none()
            && self.duration_ms.is_none()
            && self.status.is_none()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

// ============================================================================
// TRANSCRIPT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable, Associations)]
#[diesel(table_name = transcripts)]
#[diesel(belongs_to(Project))]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: String,
    pub project_id: String,
    pub provider: String,
    pub segments_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transcript {
    pub fn segments(&self) -> StoreResult<serde_json::Value> {
        parse_json("segmentsJson", &self.segments_json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = transcripts)]
#[serde(rename_all = "camelCase")]
pub struct NewTranscript {
    pub id: String,
    pub project_id: String,
    pub provider: String,
    pub segments_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewTranscript {
    pub fn new(
        project_id: impl Into<String>,
        provider: impl Into<String>,
        segments: &serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            project_id: project_id.into(),
            provider: provider.into(),
            segments_json: segments.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewTranscript {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("projectId", &self.project_id)?;
        validate::non_empty("provider", &self.provider)?;
        validate::json_text("segmentsJson", &self.segments_json)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = transcripts)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptUpdate {
    pub provider: Option<String>,
    pub segments_json: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validate for TranscriptUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.provider, |v| validate::non_empty("provider", v))?;
        validate::optional(&self.segments_json, |v| validate::json_text("segmentsJson", v))
    }
}

impl Changes for TranscriptUpdate {
    fn is_empty(&self) -> bool {
        self.provider.is_none() && self.segments_json.is_none()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

// ============================================================================
// CLIP CANDIDATE
// ============================================================================

/// A scored window proposed for clipping. `stats_json` is opaque here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable, Associations)]
#[diesel(table_name = clip_candidates)]
#[diesel(belongs_to(Project))]
#[serde(rename_all = "camelCase")]
pub struct ClipCandidate {
    pub id: String,
    pub project_id: String,
    pub start_ms: i32,
    pub end_ms: i32,
    pub stats_json: String,
    pub created_at: DateTime<Utc>,
}

impl ClipCandidate {
    pub fn stats(&self) -> StoreResult<serde_json::Value> {
        parse_json("statsJson", &self.stats_json)
    }

    pub fn duration_ms(&self) -> i32 {
        self.end_ms - self.start_ms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = clip_candidates)]
#[serde(rename_all = "camelCase")]
pub struct NewClipCandidate {
    pub id: String,
    pub project_id: String,
    pub start_ms: i32,
    pub end_ms: i32,
    pub stats_json: String,
    pub created_at: DateTime<Utc>,
}

impl NewClipCandidate {
    pub fn new(
        project_id: impl Into<String>,
        start_ms: i32,
        end_ms: i32,
        stats: &serde_json::Value,
    ) -> Self {
        Self {
            id: new_id(),
            project_id: project_id.into(),
            start_ms,
            end_ms,
            stats_json: stats.to_string(),
            created_at: Utc::now(),
        }
    }
}

impl Validate for NewClipCandidate {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("projectId", &self.project_id)?;
        validate::time_range(self.start_ms, self.end_ms)?;
        validate::json_text("statsJson", &self.stats_json)
    }
}

/// Only one side of the range may be known at validation time, so the
/// ordering check runs when both are given. `ClipCandidate_range_check`
/// rejects single-sided updates that would invert the stored range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = clip_candidates)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipCandidateUpdate {
    pub start_ms: Option<i32>,
    pub end_ms: Option<i32>,
    pub stats_json: Option<String>,
}

impl Validate for ClipCandidateUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.start_ms, |v| validate::non_negative("startMs", *v))?;
        if let (Some(start), Some(end)) = (self.start_ms, self.end_ms) {
            validate::time_range(start, end)?;
        }
        validate::optional(&self.stats_json, |v| validate::json_text("statsJson", v))
    }
}

impl Changes for ClipCandidateUpdate {
    fn is_empty(&self) -> bool {
        self.start_ms.is_none() && self.end_ms.is_none() && self.stats_json.is_none()
    }
}
