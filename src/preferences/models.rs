use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::Platform;
use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::shared::schema::{autopilot_configs, clip_profiles, settings, theme_presets};
use crate::core::shared::utils::new_id;
use crate::core::shared::validate::{self, Changes, Validate};

// ============================================================================
// CLIP PROFILE
// ============================================================================

/// Named clipping configuration. `config_json` is stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = clip_profiles)]
#[serde(rename_all = "camelCase")]
pub struct ClipProfile {
    pub id: String,
    pub name: String,
    pub config_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClipProfile {
    pub fn config(&self) -> StoreResult<serde_json::Value> {
        serde_json::from_str(&self.config_json)
            .map_err(|e| StoreError::validation(format!("configJson is not valid JSON: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = clip_profiles)]
#[serde(rename_all = "camelCase")]
pub struct NewClipProfile {
    pub id: String,
    pub name: String,
    pub config_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewClipProfile {
    pub fn new(name: impl Into<String>, config: &serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.into(),
            config_json: config.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewClipProfile {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("name", &self.name)?;
        validate::json_text("configJson", &self.config_json)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = clip_profiles)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipProfileUpdate {
    pub name: Option<String>,
    pub config_json: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validate for ClipProfileUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.name, |v| validate::non_empty("name", v))?;
        validate::optional(&self.config_json, |v| validate::json_text("configJson", v))
    }
}

impl Changes for ClipProfileUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.config_json.is_none()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

// ============================================================================
// THEME PRESET
// ============================================================================

/// Subtitle styling. Colours use the formats accepted by
/// [`validate::color`]; `alignment` is the numpad position (1-9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = theme_presets)]
#[serde(rename_all = "camelCase")]
pub struct ThemePreset {
    pub id: String,
    pub name: String,
    pub font_family: String,
    pub primary_color: String,
    pub outline_color: String,
    pub alignment: i32,
    pub margin_v: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = theme_presets)]
#[serde(rename_all = "camelCase")]
pub struct NewThemePreset {
    pub id: String,
    pub name: String,
    pub font_family: String,
    pub primary_color: String,
    pub outline_color: String,
    pub alignment: i32,
    pub margin_v: i32,
    pub created_at: DateTime<Utc>,
}

impl NewThemePreset {
    /// Bottom-centred white text with a black outline.
    pub fn new(name: impl Into<String>, font_family: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            font_family: font_family.into(),
            primary_color: "#FFFFFF".to_string(),
            outline_color: "#000000".to_string(),
            alignment: 2,
            margin_v: 40,
            created_at: Utc::now(),
        }
    }

    pub fn with_colors(mut self, primary: impl Into<String>, outline: impl Into<String>) -> Self {
        self.primary_color = primary.into();
        self.outline_color = outline.into();
        self
    }

    pub fn with_layout(mut self, alignment: i32, margin_v: i32) -> Self {
        self.alignment = alignment;
        self.margin_v = margin_v;
        self
    }
}

impl Validate for NewThemePreset {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("name", &self.name)?;
        validate::non_empty("fontFamily", &self.font_family)?;
        validate::color("primaryColor", &self.primary_color)?;
        validate::color("outlineColor", &self.outline_color)?;
        validate::alignment(self.alignment)?;
        validate::non_negative("marginV", self.margin_v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = theme_presets)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemePresetUpdate {
    pub name: Option<String>,
    pub font_family: Option<String>,
    pub primary_color: Option<String>,
    pub outline_color: Option<String>,
    pub alignment: Option<i32>,
    pub margin_v: Option<i32>,
}

impl Validate for ThemePresetUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.name, |v| validate::non_empty("name", v))?;
        validate::optional(&self.font_family, |v| validate::non_empty("fontFamily", v))?;
        validate::optional(&self.primary_color, |v| validate::color("primaryColor", v))?;
        validate::optional(&self.outline_color, |v| validate::color("outlineColor", v))?;
        validate::optional(&self.alignment, |v| validate::alignment(*v))?;
        validate::optional(&self.margin_v, |v| validate::non_negative("marginV", *v))
    }
}

impl Changes for ThemePresetUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.font_family.is_none()
            && self.primary_color.is_none()
            && self.outline_color.is_none()
            && self.alignment.is_none()
            && self.margin_v.is_none()
    }
}

// ============================================================================
// SETTINGS
// ============================================================================

/// One key/value application setting. Keys are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = settings)]
pub struct Settings {
    pub id: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = settings)]
pub struct NewSettings {
    pub id: String,
    pub key: String,
    pub value: String,
}

impl NewSettings {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Validate for NewSettings {
    fn validate(&self) -> StoreResult<()> {
        validate::non_empty("key", &self.key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = settings)]
#[serde(default)]
pub struct SettingsUpdate {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl SettingsUpdate {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: Some(value.into()),
        }
    }
}

impl Validate for SettingsUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.key, |v| validate::non_empty("key", v))
    }
}

impl Changes for SettingsUpdate {
    fn is_empty(&self) -> bool {
        self.key.is_none() && self.value.is_none()
    }
}

// ============================================================================
// AUTOPILOT CONFIG
// ============================================================================

/// Stored autopilot parameters. Nothing in this crate acts on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = autopilot_configs)]
#[serde(rename_all = "camelCase")]
pub struct AutopilotConfig {
    pub id: String,
    pub keywords: String,
    pub target_platform: Platform,
    pub max_daily_downloads: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AutopilotConfig {
    /// `keywords` split on commas, trimmed, empties dropped.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = autopilot_configs)]
#[serde(rename_all = "camelCase")]
pub struct NewAutopilotConfig {
    pub id: String,
    pub keywords: String,
    pub target_platform: Platform,
    pub max_daily_downloads: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewAutopilotConfig {
    pub fn new(keywords: impl Into<String>, target_platform: Platform, max_daily_downloads: i32) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            keywords: keywords.into(),
            target_platform,
            max_daily_downloads,
            is_active: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }
}

impl Validate for NewAutopilotConfig {
    fn validate(&self) -> StoreResult<()> {
        validate::non_negative("maxDailyDownloads", self.max_daily_downloads)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = autopilot_configs)]
#[serde(rename_all = "camelCase", default)]
pub struct AutopilotConfigUpdate {
    pub keywords: Option<String>,
    pub target_platform: Option<Platform>,
    pub max_daily_downloads: Option<i32>,
    pub is_active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validate for AutopilotConfigUpdate {
    fn validate(&self) -> StoreResult<()> {
        validate::optional(&self.max_daily_downloads, |v| {
            validate::non_negative("maxDailyDownloads", *v)
        })
    }
}

impl Changes for AutopilotConfigUpdate {
    fn is_empty(&self) -> bool {
        self.keywords.is_none()
            && self.target_platform.is_none()
            && self.max_daily_downloads.is_none()
            && self.is_active.is_none()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_theme_preset_defaults_are_valid() {
        let preset = NewThemePreset::new("Bold", "Montserrat");
        assert!(preset.validate().is_ok());
        assert_eq!(preset.alignment, 2);
    }

    #[test]
    fn test_theme_preset_rejects_bad_layout_and_colour() {
        let preset = NewThemePreset::new("Bold", "Montserrat").with_layout(11, 40);
        assert!(preset.validate().is_err());
        let preset = NewThemePreset::new("Bold", "Montserrat").with_layout(5, -10);
        assert!(preset.validate().is_err());
        let preset = NewThemePreset::new("Bold", "Montserrat").with_colors("yellow", "#000000");
        assert!(preset.validate().is_err());
        let preset = NewThemePreset::new("Karaoke", "Arial").with_colors("&H0000FFFF", "&H00000000");
        assert!(preset.validate().is_ok());
    }

    #[test]
    fn test_clip_profile_config_must_be_json() {
        let profile = NewClipProfile::new("Shorts", &json!({ "maxLengthMs": 60000 }));
        assert!(profile.validate().is_ok());
        let profile = NewClipProfile {
            config_json: "maxLength=60".into(),
            ..profile
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_settings_key_required() {
        assert!(NewSettings::new("", "x").validate().is_err());
        assert!(NewSettings::new("theme", "dark").validate().is_ok());
        assert!(!SettingsUpdate::value("light").is_empty());
    }

    #[test]
    fn test_autopilot_keywords_and_limits() {
        let now = Utc::now();
        let config = AutopilotConfig {
            id: "a1".into(),
            keywords: " rocket league, , highlights ,goals".into(),
            target_platform: Platform::Tiktok,
            max_daily_downloads: 5,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(config.keyword_list(), vec!["rocket league", "highlights", "goals"]);
        assert!(NewAutopilotConfig::new("k", Platform::X, -1).validate().is_err());
        assert!(!NewAutopilotConfig::new("k", Platform::X, 3).is_active);
    }
}
