diesel::table! {
    #[sql_name = "Clip"]
    clips (id) {
        id -> Text,
        #[sql_name = "projectId"]
        project_id -> Text,
        #[sql_name = "startMs"]
        start_ms -> Int4,
        #[sql_name = "endMs"]
        end_ms -> Int4,
        #[sql_name = "scoresJson"]
        scores_json -> Text,
        caption -> Nullable<Text>,
        status -> Text,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
        #[sql_name = "updatedAt"]
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    #[sql_name = "Asset"]
    assets (id) {
        id -> Text,
        #[sql_name = "clipId"]
        clip_id -> Text,
        kind -> Text,
        #[sql_name = "storagePath"]
        storage_path -> Text,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
    }
}

diesel::table! {
    #[sql_name = "Analytics"]
    analytics (id) {
        id -> Text,
        #[sql_name = "clipId"]
        clip_id -> Text,
        platform -> Text,
        views -> Int4,
        likes -> Int4,
        comments -> Int4,
        shares -> Int4,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
        #[sql_name = "updatedAt"]
        updated_at -> Timestamptz,
    }
}
