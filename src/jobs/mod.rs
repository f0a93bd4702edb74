use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::Serialize;

use crate::core::shared::delegate::{model_aggregate, model_delegate, GroupCount};
use crate::core::shared::enums::JobStatus;
use crate::core::shared::error::{ModelContext, StoreResult};
use crate::core::shared::filters::{or_true, FindManyArgs};
use crate::core::shared::schema::jobs;

pub mod filters;
pub mod models;

pub use filters::JobWhere;
pub use models::{Job, JobUpdate, NewJob};

model_delegate! {
    JobDelegate {
        model: "Job",
        table: jobs,
        row: Job,
        create: NewJob,
        update: JobUpdate,
        filter: JobWhere,
        upsert_on: (id),
        order: JobOrderBy {
            Id => id,
            Type => job_type,
            Status => status,
            Attempts => attempts,
            NextRetryAt => next_retry_at,
            ScheduledAt => scheduled_at,
            CreatedAt => created_at,
            UpdatedAt => updated_at,
        },
    }
}

model_aggregate!(JobDelegate, jobs, JobWhere, JobAggregate { attempts });

pub type JobFindMany = FindManyArgs<JobWhere, JobOrderBy>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTypeStatusCount {
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: JobStatus,
    pub count: i64,
}

impl<'c> JobDelegate<'c> {
    pub fn group_by_status(&mut self, filter: &JobWhere) -> StoreResult<Vec<GroupCount<JobStatus>>> {
        let rows = jobs::table
            .filter(or_true(filter.to_condition()))
            .group_by(jobs::status)
            .select((jobs::status, count_star()))
            .order(jobs::status.asc())
            .load::<(JobStatus, i64)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }

    pub fn group_by_type_and_status(&mut self, filter: &JobWhere) -> StoreResult<Vec<JobTypeStatusCount>> {
        let rows = jobs::table
            .filter(or_true(filter.to_condition()))
            .group_by((jobs::job_type, jobs::status))
            .select((jobs::job_type, jobs::status, count_star()))
            .order((jobs::job_type.asc(), jobs::status.asc()))
            .load::<(String, JobStatus, i64)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows
            .into_iter()
            .map(|(job_type, status, count)| JobTypeStatusCount {
                job_type,
                status,
                count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::filters::OrderBy;

    #[test]
    fn test_job_order_by_type_uses_type_column() {
        let args = JobFindMany::new()
            .filter(JobWhere::status(JobStatus::Pending))
            .order_by(OrderBy::asc(JobOrderBy::Type))
            .order_by(OrderBy::asc(JobOrderBy::CreatedAt));
        let query = JobDelegate::boxed_query(&args).unwrap();
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(
            sql.contains("ORDER BY \"Job\".\"type\" ASC, \"Job\".\"createdAt\" ASC"),
            "{sql}"
        );
    }

    #[test]
    fn test_job_order_by_deserializes() {
        let order: JobOrderBy = serde_json::from_str("\"nextRetryAt\"").unwrap();
        assert_eq!(order, JobOrderBy::NextRetryAt);
    }
}
