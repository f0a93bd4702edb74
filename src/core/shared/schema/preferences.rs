diesel::table! {
    #[sql_name = "ClipProfile"]
    clip_profiles (id) {
        id -> Text,
        name -> Text,
        #[sql_name = "configJson"]
        config_json -> Text,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
        #[sql_name = "updatedAt"]
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    #[sql_name = "ThemePreset"]
    theme_presets (id) {
        id -> Text,
        name -> Text,
        #[sql_name = "fontFamily"]
        font_family -> Text,
        #[sql_name = "primaryColor"]
        primary_color -> Text,
        #[sql_name = "outlineColor"]
        outline_color -> Text,
        alignment -> Int4,
        #[sql_name = "marginV"]
        margin_v -> Int4,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
    }
}

diesel::table! {
    #[sql_name = "Settings"]
    settings (id) {
        id -> Text,
        key -> Text,
        value -> Text,
    }
}

diesel::table! {
    #[sql_name = "AutopilotConfig"]
    autopilot_configs (id) {
        id -> Text,
        keywords -> Text,
        #[sql_name = "targetPlatform"]
        target_platform -> Text,
        #[sql_name = "maxDailyDownloads"]
        max_daily_downloads -> Int4,
        #[sql_name = "isActive"]
        is_active -> Bool,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
        #[sql_name = "updatedAt"]
        updated_at -> Timestamptz,
    }
}
