//! Stand-alone configuration tables: clip profiles, subtitle themes, key/value
//! settings and autopilot configs.

use diesel::dsl::count_star;
use diesel::prelude::*;
use log::info;

use crate::core::shared::delegate::{model_aggregate, model_delegate, GroupCount};
use crate::core::shared::enums::Platform;
use crate::core::shared::error::{ModelContext, StoreResult};
use crate::core::shared::filters::{or_true, FindManyArgs};
use crate::core::shared::schema::{autopilot_configs, clip_profiles, settings, theme_presets};

pub mod filters;
pub mod models;

pub use filters::{AutopilotConfigWhere, ClipProfileWhere, SettingsWhere, ThemePresetWhere};
pub use models::{
    AutopilotConfig, AutopilotConfigUpdate, ClipProfile, ClipProfileUpdate, NewAutopilotConfig,
    NewClipProfile, NewSettings, NewThemePreset, Settings, SettingsUpdate, ThemePreset,
    ThemePresetUpdate,
};

model_delegate! {
    ClipProfileDelegate {
        model: "ClipProfile",
        table: clip_profiles,
        row: ClipProfile,
        create: NewClipProfile,
        update: ClipProfileUpdate,
        filter: ClipProfileWhere,
        upsert_on: (id),
        order: ClipProfileOrderBy {
            Id => id,
            Name => name,
            CreatedAt => created_at,
            UpdatedAt => updated_at,
        },
    }
}

model_delegate! {
    ThemePresetDelegate {
        model: "ThemePreset",
        table: theme_presets,
        row: ThemePreset,
        create: NewThemePreset,
        update: ThemePresetUpdate,
        filter: ThemePresetWhere,
        upsert_on: (id),
        order: ThemePresetOrderBy {
            Id => id,
            Name => name,
            FontFamily => font_family,
            Alignment => alignment,
            MarginV => margin_v,
            CreatedAt => created_at,
        },
    }
}

model_aggregate!(
    ThemePresetDelegate,
    theme_presets,
    ThemePresetWhere,
    ThemePresetAggregate { alignment, margin_v }
);

model_delegate! {
    /// Upserts resolve on `key`.
    SettingsDelegate {
        model: "Settings",
        table: settings,
        row: Settings,
        create: NewSettings,
        update: SettingsUpdate,
        filter: SettingsWhere,
        upsert_on: (key),
        order: SettingsOrderBy {
            Id => id,
            Key => key,
            Value => value,
        },
    }
}

model_delegate! {
    AutopilotConfigDelegate {
        model: "AutopilotConfig",
        table: autopilot_configs,
        row: AutopilotConfig,
        create: NewAutopilotConfig,
        update: AutopilotConfigUpdate,
        filter: AutopilotConfigWhere,
        upsert_on: (id),
        order: AutopilotConfigOrderBy {
            Id => id,
            Keywords => keywords,
            TargetPlatform => target_platform,
            MaxDailyDownloads => max_daily_downloads,
            IsActive => is_active,
            CreatedAt => created_at,
            UpdatedAt => updated_at,
        },
    }
}

model_aggregate!(
    AutopilotConfigDelegate,
    autopilot_configs,
    AutopilotConfigWhere,
    AutopilotConfigAggregate { max_daily_downloads }
);

pub type ClipProfileFindMany = FindManyArgs<ClipProfileWhere, ClipProfileOrderBy>;
pub type ThemePresetFindMany = FindManyArgs<ThemePresetWhere, ThemePresetOrderBy>;
pub type SettingsFindMany = FindManyArgs<SettingsWhere, SettingsOrderBy>;
pub type AutopilotConfigFindMany = FindManyArgs<AutopilotConfigWhere, AutopilotConfigOrderBy>;

impl<'c> SettingsDelegate<'c> {
    pub fn find_unique_by_key(&mut self, key: &str) -> StoreResult<Option<Settings>> {
        settings::table
            .filter(settings::key.eq(key))
            .first::<Settings>(self.conn())
            .optional()
            .for_model(Self::MODEL)
    }

    pub fn get_value(&mut self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.find_unique_by_key(key)?.map(|s| s.value))
    }

    /// Creates or overwrites the setting stored under `key`.
    pub fn set_value(&mut self, key: &str, value: &str) -> StoreResult<Settings> {
        let row = self.upsert(NewSettings::new(key, value), SettingsUpdate::value(value))?;
        info!("Setting {key} updated");
        Ok(row)
    }

    pub fn delete_by_key(&mut self, key: &str) -> StoreResult<Option<Settings>> {
        diesel::delete(settings::table.filter(settings::key.eq(key)))
            .get_result::<Settings>(self.conn())
            .optional()
            .for_model(Self::MODEL)
    }
}

impl<'c> AutopilotConfigDelegate<'c> {
    pub fn group_by_target_platform(
        &mut self,
        filter: &AutopilotConfigWhere,
    ) -> StoreResult<Vec<GroupCount<Platform>>> {
        let rows = autopilot_configs::table
            .filter(or_true(filter.to_condition()))
            .group_by(autopilot_configs::target_platform)
            .select((autopilot_configs::target_platform, count_star()))
            .order(autopilot_configs::target_platform.asc())
            .load::<(Platform, i64)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }
}
