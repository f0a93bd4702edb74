use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::{AssetKind, ClipStatus, Platform};
use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::shared::schema::{analytics, assets, clips};
use crate::core::shared::utils::new_id;
use crate::core::shared::validate::{self, Changes, Validate};
use crate::project::models::Project;

// ============================================================================
// CLIP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable, Associations)]
#[diesel(table_name = clips)]
#[diesel(belongs_to(Project))]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    pub project_id: String,
    pub start_ms: i32,
    pub end_ms: i32,
    pub scores_json: String,
    pub caption: Option<String>,
    pub status: ClipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Clip {
    pub fn scores(&self) -> StoreResult<serde_json::Value> {
        serde_json::from_str(&self.scores_json)
            .map_err(|e| StoreError::validation(format!("scoresJson is not valid JSON: {e}")))
    }

    pub fn duration_ms(&self) -> i32 {
        self.end_ms - self.start_ms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = clips)]
#[serde(rename_all = "camelCase")]
pub struct NewClip {
    pub id: String,
    pub project_id: String,
    pub start_ms: i32,
    pub end_ms: i32,
    pub scores_json: String,
    pub caption: Option<String>,
    pub status: ClipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewClip {
    pub fn new(project_id: impl Into<String>, start_ms: i32, end_ms: i32) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            project_id: project_id.into(),
            start_ms,
            end_ms,
            scores_json: "{}".to_string(),
            caption: None,
            status: ClipStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_scores(mut self, scores: &serde_json::Value) -> Self {
        self.scores_json = scores.to_string();
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_status(mut self, status: ClipStatus) -> Self {
        self.status = status;
        self
    }
}

impl Validate for NewClip {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("id", &self.id)?;
        validate::non_empty("projectId", &self.project_id)?;
        validate::time_range(self.start_ms, self.end_ms)?;
        validate::json_text("scoresJson", &self.scores_json)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = clips)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipUpdate {
    pub start_ms: Option<i32>,
    pub end_ms: Option<i32>,
    pub scores_json: Option<String>,
    pub caption: Option<Option<String>>,
    pub status: Option<ClipStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ClipUpdate {
    pub fn status(status: ClipStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Validate for ClipUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.start_ms, |v| validate::non_negative("startMs", *v))?;
        if let (Some(start), Some(end)) = (self.start_ms, self.end_ms) {
            validate::time_range(start, end)?;
        }
        validate::optional(&self.scores_json, |v| validate::json_text("scoresJson", v))
    }
}

impl Changes for ClipUpdate {
    fn is_empty(&self) -> bool {
        self.start_ms.is_none()
            && self.end_ms.is_none()
            && self.scores_json.is_none()
            && self.caption.is_none()
            && self.status.is_none()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

// ============================================================================
// ASSET
// ============================================================================

/// A rendered file belonging to a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable, Associations)]
#[diesel(table_name = assets)]
#[diesel(belongs_to(Clip))]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub clip_id: String,
    pub kind: AssetKind,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = assets)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub id: String,
    pub clip_id: String,
    pub kind: AssetKind,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

impl NewAsset {
    pub fn new(clip_id: impl Into<String>, kind: AssetKind, storage_path: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            clip_id: clip_id.into(),
            kind,
            storage_path: storage_path.into(),
            created_at: Utc::now(),
        }
    }
}

impl Validate for NewAsset {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("clipId", &self.clip_id)?;
        validate::non_empty("storagePath", &self.storage_path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = assets)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetUpdate {
    pub kind: Option<AssetKind>,
    pub storage_path: Option<String>,
}

impl Validate for AssetUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.storage_path, |v| validate::non_empty("storagePath", v))
    }
}

impl Changes for AssetUpdate {
    fn is_empty(&self) -> bool {
        self.kind.is_none() && self.storage_path.is_none()
    }
}

// ============================================================================
// ANALYTICS
// ============================================================================

/// Engagement counters of one clip on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable, Associations)]
#[diesel(table_name = analytics)]
#[diesel(belongs_to(Clip))]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub id: String,
    pub clip_id: String,
    pub platform: Platform,
    pub views: i32,
    pub likes: i32,
    pub comments: i32,
    pub shares: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Analytics {
    /// Interactions per view, `None` before the first view.
    pub fn engagement_rate(&self) -> Option<f64> {
        if self.views == 0 {
            return None;
        }
        let interactions = self.likes as f64 + self.comments as f64 + self.shares as f64;
        Some(interactions / self.views as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = analytics)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalytics {
    pub id: String,
    pub clip_id: String,
    pub platform: Platform,
    pub views: i32,
    pub likes: i32,
    pub comments: i32,
    pub shares: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewAnalytics {
    pub fn new(clip_id: impl Into<String>, platform: Platform) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            clip_id: clip_id.into(),
            platform,
            views: 0,
            likes: 0,
            comments: 0,
            shares: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_counts(mut self, views: i32, likes: i32, comments: i32, shares: i32) -> Self {
        self.views = views;
        self.likes = likes;
        self.comments = comments;
        self.shares = shares;
        self
    }
}

impl Validate for NewAnalytics {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("clipId", &self.clip_id)?;
        validate::non_negative("views", self.views)?;
        validate::non_negative("likes", self.likes)?;
        validate::non_negative("comments", self.comments)?;
        validate::non_negative("shares", self.shares)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = analytics)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsUpdate {
    pub views: Option<i32>,
    pub likes: Option<i32>,
    pub comments: Option<i32>,
    pub shares: Option<i32>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AnalyticsUpdate {
    pub fn counts(views: i32, likes: i32, comments: i32, shares: i32) -> Self {
        Self {
            views: Some(views),
            likes: Some(likes),
            comments: Some(comments),
            shares: Some(shares),
            updated_at: None,
        }
    }
}

impl Validate for AnalyticsUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.views, |v| validate::non_negative("views", *v))?;
        validate::optional(&self.likes, |v| validate::non_negative("likes", *v))?;
        validate::optional(&self.comments, |v| validate::non_negative("comments", *v))?;
        validate::optional(&self.shares, |v| validate::non_negative("shares", *v))
    }
}

impl Changes for AnalyticsUpdate {
    fn is_empty(&self) -> bool {
        self.views.is_none() && self.likes.is_none() && self.comments.is_none() && self.shares.is_none()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}
