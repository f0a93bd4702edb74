use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::JobStatus;
use crate::core::shared::filters::{
    all_of, enum_filter, nullable_filter, push_nested, scalar_filter, string_filter, Condition,
    DateTimeFilter, EnumFilter, IntFilter, Nullable, NullableDateTimeFilter, NullableStringFilter,
    ScalarFilter, StringFilter,
};
use crate::core::shared::schema::jobs;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobWhere {
    pub id: Option<StringFilter>,
    #[serde(rename = "type")]
    pub job_type: Option<StringFilter>,
    pub status: Option<EnumFilter<JobStatus>>,
    pub attempts: Option<IntFilter>,
    pub error: Option<NullableStringFilter>,
    pub next_retry_at: Option<NullableDateTimeFilter>,
    pub scheduled_at: Option<NullableDateTimeFilter>,
    pub created_at: Option<DateTimeFilter>,
    pub updated_at: Option<DateTimeFilter>,
    #[serde(rename = "AND")]
    pub and: Vec<JobWhere>,
    #[serde(rename = "OR")]
    pub or: Vec<JobWhere>,
    #[serde(rename = "NOT")]
    pub not: Vec<JobWhere>,
}

impl JobWhere {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(EnumFilter::equals(status)),
            ..Default::default()
        }
    }

    /// Pending jobs whose retry time (if any) is not after `now`.
    pub fn due(now: DateTime<Utc>) -> Self {
        Self {
            status: Some(EnumFilter::equals(JobStatus::Pending)),
            or: vec![
                Self {
                    next_retry_at: Some(Nullable::is_null()),
                    ..Default::default()
                },
                Self {
                    next_retry_at: Some(Nullable::matching(ScalarFilter {
                        lte: Some(now),
                        ..Default::default()
                    })),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    pub fn to_condition(&self) -> Option<Condition<jobs::table>> {
        let mut conditions: Vec<Condition<jobs::table>> = Vec::new();
        if let Some(f) = &self.id {
            string_filter!(conditions, jobs::id, f);
        }
        if let Some(f) = &self.job_type {
            string_filter!(conditions, jobs::job_type, f);
        }
        if let Some(f) = &self.status {
            enum_filter!(conditions, jobs::status, f);
        }
        if let Some(f) = &self.attempts {
            scalar_filter!(conditions, jobs::attempts, f);
        }
        if let Some(f) = &self.error {
            nullable_filter!(string_filter, conditions, jobs::error, f);
        }
        if let Some(f) = &self.next_retry_at {
            nullable_filter!(scalar_filter, conditions, jobs::next_retry_at, f);
        }
        if let Some(f) = &self.scheduled_at {
            nullable_filter!(scalar_filter, conditions, jobs::scheduled_at, f);
        }
        if let Some(f) = &self.created_at {
            scalar_filter!(conditions, jobs::created_at, f);
        }
        if let Some(f) = &self.updated_at {
            scalar_filter!(conditions, jobs::updated_at, f);
        }
        push_nested(&mut conditions, &self.and, &self.or, &self.not, Self::to_condition);
        all_of(conditions)
    }
}
