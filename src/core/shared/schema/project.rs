diesel::table! {
    #[sql_name = "Project"]
    projects (id) {
        id -> Text,
        title -> Text,
        #[sql_name = "sourcePath"]
        source_path -> Text,
        #[sql_name = "durationMs"]
        duration_ms -> Nullable<Int4>,
        status -> Text,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
        #[sql_name = "updatedAt"]
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    #[sql_name = "Transcript"]
    transcripts (id) {
        id -> Text,
        #[sql_name = "projectId"]
        project_id -> Text,
        provider -> Text,
        #[sql_name = "segmentsJson"]
        segments_json -> Text,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
        #[sql_name = "updatedAt"]
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    #[sql_name = "ClipCandidate"]
    clip_candidates (id) {
        id -> Text,
        #[sql_name = "projectId"]
        project_id -> Text,
        #[sql_name = "startMs"]
        start_ms -> Int4,
        #[sql_name = "endMs"]
        end_ms -> Int4,
        #[sql_name = "statsJson"]
        stats_json -> Text,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
    }
}
