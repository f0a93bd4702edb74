use serde::{Deserialize, Serialize};

use crate::core::shared::enums::ProjectStatus;
use crate::core::shared::filters::{
    all_of, enum_filter, nullable_filter, push_nested, scalar_filter, string_filter, Condition,
    DateTimeFilter, EnumFilter, IntFilter, NullableIntFilter, StringFilter,
};
use crate::core::shared::schema::{clip_candidates, projects, transcripts};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectWhere {
    pub id: Option<StringFilter>,
    pub title: Option<StringFilter>,
    pub source_path: Option<StringFilter>,
    pub duration_ms: Option<NullableIntFilter>,
    pub status: Option<EnumFilter<ProjectStatus>>,
    pub created_at: Option<DateTimeFilter>,
    pub updated_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<ProjectWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<ProjectWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<ProjectWhere>,
}

impl ProjectWhere {
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(EnumFilter::equals(status)),
            ..Default::default()
        }
    }

    pub fn to_condition(&self) -> Option<Condition<projects::table>> {
        let mut conditions: Vec<Condition<projects::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, projects::id, f);
        }
        if let Some(f) = &self.title {
            string_filter!(conditions, projects::title, f);
        }
        if let Some(f) = &self.source_path {
            string_filter!(conditions, projects::source_path, f);
        }
        if let Some(f) = &self.duration_ms {
            nullable_filter!(scalar_filter, conditions, projects::duration_ms, f);
        }
        if let Some(f) = &self.status {
            enum_filter!(conditions, projects::status, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, projects::created_at, f);
        }
        if let Some(f) = &self.updated_at {
            scalar_filter!(conditions, projects::updated_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptWhere {
    pub id: Option<StringFilter>,
    pub project_id: Option<StringFilter>,
    pub provider: Option<StringFilter>,
    pub created_at: Option<DateTimeFilter>,
    pub updated_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<TranscriptWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<TranscriptWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<TranscriptWhere>,
}

impl TranscriptWhere {
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(StringFilter::equals(project_id)),
            ..Default::default()
        }
    }

    pub fn to_condition(&self) -> Option<Condition<transcripts::table>> {
        let mut conditions: Vec<Condition<transcripts::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, transcripts::id, f);
        }
        if let Some(f) = &self.project_id {
            string_filter!(conditions, transcripts::project_id, f);
        }
        if let Some(f) = &self.provider {
            string_filter!(conditions, transcripts::provider, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, transcripts::created_at, f);
        }
        if let Some(f) = &self.updated_at {
            scalar_filter!(conditions, transcripts::updated_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipCandidateWhere {
    pub id: Option<StringFilter>,
    pub project_id: Option<StringFilter>,
    pub start_ms: Option<IntFilter>,
    pub end_ms: Option<IntFilter>,
    pub created_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<ClipCandidateWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<ClipCandidateWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<ClipCandidateWhere>,
}

impl ClipCandidateWhere {
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(StringFilter::equals(project_id)),
            ..Default::default()
        }
    }

    pub fn to_condition(&self) -> Option<Condition<clip_candidates::table>> {
        let mut conditions: Vec<Condition<clip_candidates::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, clip_candidates::id, f);
        }
        if let Some(f) = &self.project_id {
            string_filter!(conditions, clip_candidates::project_id, f);
        }
        if let Some(f) = &self.start_ms {
            scalar_filter!(conditions, clip_candidates::start_ms, f);
        }
        if let Some(f) = &self.end_ms {
            scalar_filter!(conditions, clip_candidates::end_ms, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, clip_candidates::created_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}
