diesel::table! {
    #[sql_name = "Job"]
    jobs (id) {
        id -> Text,
        #[sql_name = "type"]
        job_type -> Text,
        #[sql_name = "payloadJson"]
        payload_json -> Text,
        status -> Text,
        attempts -> Int4,
        error -> Nullable<Text>,
        #[sql_name = "nextRetryAt"]
        next_retry_at -> Nullable<Timestamptz>,
        #[sql_name = "scheduledAt"]
        scheduled_at -> Nullable<Timestamptz>,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
        #[sql_name = "updatedAt"]
        updated_at -> Timestamptz,
    }
}
