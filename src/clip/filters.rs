use serde::{Deserialize, Serialize};

use crate::core::shared::enums::{AssetKind, ClipStatus, Platform};
use crate::core::shared::filters::{
    all_of, enum_filter, nullable_filter, push_nested, scalar_filter, string_filter, Condition,
    DateTimeFilter, EnumFilter, IntFilter, NullableStringFilter, StringFilter,
};
use crate::core::shared::schema::{analytics, assets, clips};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipWhere {
    pub id: Option<StringFilter>,
    pub project_id: Option<StringFilter>,
    pub start_ms: Option<IntFilter>,
    pub end_ms: Option<IntFilter>,
    pub caption: Option<NullableStringFilter>,
    pub status: Option<EnumFilter<ClipStatus>>,
    pub created_at: Option<DateTimeFilter>,
    pub updated_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<ClipWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<ClipWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<ClipWhere>,
}

impl ClipWhere {
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(StringFilter::equals(project_id)),
            ..Default::default()
        }
    }

    pub fn status(status: ClipStatus) -> Self {
        Self {
            status: Some(EnumFilter::equals(status)),
            ..Default::default()
        }
    }

    pub fn to_condition(&self) -> Option<Condition<clips::table>> {
        let mut conditions: Vec<Condition<clips::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, clips::id, f);
        }
        if let Some(f) = &self.project_id {
            string_filter!(conditions, clips::project_id, f);
        }
        if let Some(f) = &self.start_ms {
            scalar_filter!(conditions, clips::start_ms, f);
        }
        if let Some(f) = &self.end_ms {
            scalar_filter!(conditions, clips::end_ms, f);
        }
        if let Some(f) = &self.caption {
            nullable_filter!(string_filter, conditions, clips::caption, f);
        }
        if let Some(f) = &self.status {
            enum_filter!(conditions, clips::status, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, clips::created_at, f);
        }
        if let Some(f) = &self.updated_at {
            scalar_filter!(conditions, clips::updated_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetWhere {
    pub id: Option<StringFilter>,
    pub clip_id: Option<StringFilter>,
    pub kind: Option<EnumFilter<AssetKind>>,
    pub storage_path: Option<StringFilter>,
    pub created_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<AssetWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<AssetWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<AssetWhere>,
}

impl AssetWhere {
    pub fn clip(clip_id: impl Into<String>) -> Self {
        Self {
            clip_id: Some(StringFilter::equals(clip_id)),
            ..Default::default()
        }
    }

    pub fn to_condition(&self) -> Option<Condition<assets::table>> {
        let mut conditions: Vec<Condition<assets::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, assets::id, f);
        }
        if let Some(f) = &self.clip_id {
            string_filter!(conditions, assets::clip_id, f);
        }
        if let Some(f) = &self.kind {
            enum_filter!(conditions, assets::kind, f);
        }
        if let Some(f) = &self.storage_path {
            string_filter!(conditions, assets::storage_path, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, assets::created_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsWhere {
    pub id: Option<StringFilter>,
    pub clip_id: Option<StringFilter>,
    pub platform: Option<EnumFilter<Platform>>,
    pub views: Option<IntFilter>,
    pub likes: Option<IntFilter>,
    pub comments: Option<IntFilter>,
    pub shares: Option<IntFilter>,
    pub created_at: Option<DateTimeFilter>,
    pub updated_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<AnalyticsWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<AnalyticsWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<AnalyticsWhere>,
}

impl AnalyticsWhere {
    pub fn clip(clip_id: impl Into<String>) -> Self {
        Self {
            clip_id: Some(StringFilter::equals(clip_id)),
            ..Default::default()
        }
    }

    pub fn platform(platform: Platform) -> Self {
        Self {
            platform: Some(EnumFilter::equals(platform)),
            ..Default::default()
        }
    }

    pub fn to_condition(&self) -> Option<Condition<analytics::table>> {
        let mut conditions: Vec<Condition<analytics::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, analytics::id, f);
        }
        if let Some(f) = &self.clip_id {
            string_filter!(conditions, analytics::clip_id, f);
        }
        if let Some(f) = &self.platform {
            enum_filter!(conditions, analytics::platform, f);
        }
        if let Some(f) = &self.views {
            scalar_filter!(conditions, analytics::views, f);
        }
        if let Some(f) = &self.likes {
            scalar_filter!(conditions, analytics::likes, f);
        }
        if let Some(f) = &self.comments {
            scalar_filter!(conditions, analytics::comments, f);
        }
        if let Some(f) = &self.shares {
            scalar_filter!(conditions, analytics::shares, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, analytics::created_at, f);
        }
        if let Some(f) = &self.updated_at {
            scalar_filter!(conditions, analytics::updated_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}
