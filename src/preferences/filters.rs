use serde::{Deserialize, Serialize};

use crate::core::shared::enums::Platform;
use crate::core::shared::filters::{
    all_of, bool_filter, enum_filter, push_nested, scalar_filter, string_filter, BoolFilter,
    Condition, DateTimeFilter, EnumFilter, IntFilter, StringFilter,
};
use crate::core::shared::schema::{autopilot_configs, clip_profiles, settings, theme_presets};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipProfileWhere {
    pub id: Option<StringFilter>,
    pub name: Option<StringFilter>,
    pub created_at: Option<DateTimeFilter>,
    pub updated_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<ClipProfileWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<ClipProfileWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<ClipProfileWhere>,
}

impl ClipProfileWhere {
    pub fn to_condition(&self) -> Option<Condition<clip_profiles::table>> {
        let mut conditions: Vec<Condition<clip_profiles::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, clip_profiles::id, f);
        }
        if let Some(f) = &self.name {
            string_filter!(conditions, clip_profiles::name, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, clip_profiles::created_at, f);
        }
        if let Some(f) = &self.updated_at {
            scalar_filter!(conditions, clip_profiles::updated_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemePresetWhere {
    pub id: Option<StringFilter>,
    pub name: Option<StringFilter>,
    pub font_family: Option<StringFilter>,
    pub alignment: Option<IntFilter>,
    pub margin_v: Option<IntFilter>,
    pub created_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<ThemePresetWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<ThemePresetWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<ThemePresetWhere>,
}

impl ThemePresetWhere {
    pub fn to_condition(&self) -> Option<Condition<theme_presets::table>> {
        let mut conditions: Vec<Condition<theme_presets::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, theme_presets::id, f);
        }
        if let Some(f) = &self.name {
            string_filter!(conditions, theme_presets::name, f);
        }
        if let Some(f) = &self.font_family {
            string_filter!(conditions, theme_presets::font_family, f);
        }
        if let Some(f) = &self.alignment {
            scalar_filter!(conditions, theme_presets::alignment, f);
        }
        if let Some(f) = &self.margin_v {
            scalar_filter!(conditions, theme_presets::margin_v, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, theme_presets::created_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsWhere {
    pub id: Option<StringFilter>,
    pub key: Option<StringFilter>,
    pub value: Option<StringFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<SettingsWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<SettingsWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<SettingsWhere>,
}

impl SettingsWhere {
    pub fn key_prefix(prefix: impl Into<String>) -> Self {
        Self {
            key: Some(StringFilter::starts_with(prefix)),
            ..Default::default()
        }
    }

    pub fn to_condition(&self) -> Option<Condition<settings::table>> {
        let mut conditions: Vec<Condition<settings::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, settings::id, f);
        }
        if let Some(f) = &self.key {
            string_filter!(conditions, settings::key, f);
        }
        if let Some(f) = &self.value {
            string_filter!(conditions, settings::value, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutopilotConfigWhere {
    pub id: Option<StringFilter>,
    pub keywords: Option<StringFilter>,
    pub target_platform: Option<EnumFilter<Platform>>,
    pub max_daily_downloads: Option<IntFilter>,
    pub is_active: Option<BoolFilter>,
    pub created_at: Option<DateTimeFilter>,
    pub updated_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<AutopilotConfigWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<AutopilotConfigWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<AutopilotConfigWhere>,
}

impl AutopilotConfigWhere {
    pub fn active() -> Self {
        Self {
            is_active: Some(BoolFilter::equals(true)),
            ..Default::default()
        }
    }

    pub fn to_condition(&self) -> Option<Condition<autopilot_configs::table>> {
        let mut conditions: Vec<Condition<autopilot_configs::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, autopilot_configs::id, f);
        }
        if let Some(f) = &self.keywords {
            string_filter!(conditions, autopilot_configs::keywords, f);
        }
        if let Some(f) = &self.target_platform {
            enum_filter!(conditions, autopilot_configs::target_platform, f);
        }
        if let Some(f) = &self.max_daily_downloads {
            scalar_filter!(conditions, autopilot_configs::max_daily_downloads, f);
        }
        if let Some(f) = &self.is_active {
            bool_filter!(conditions, autopilot_configs::is_active, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, autopilot_configs::created_at, f);
        }
        if let Some(f) = &self.updated_at {
            scalar_filter!(conditions, autopilot_configs::updated_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}
