//! Raw SQL with positional `$n` parameters.

use chrono::{DateTime, Utc};
use diesel::deserialize::QueryableByName;
use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Bool, Double, Integer, Nullable, Text, Timestamptz};
use diesel::{PgConnection, RunQueryDsl};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::shared::error::StoreResult;

/// A bind parameter. `Null` binds as a text NULL, so comparisons against
/// non-text columns need an explicit cast (`$1::int`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Double(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<DateTime<Utc>> for RawValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

fn bind_all(sql: &str, params: &[RawValue]) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    let mut query = diesel::sql_query(sql.to_string()).into_boxed::<Pg>();
    for param in params {
        query = match param.clone() {
            RawValue::Null => query.bind::<Nullable<Text>, _>(None::<String>),
            RawValue::Bool(v) => query.bind::<Bool, _>(v),
            RawValue::Int(v) => query.bind::<Integer, _>(v),
            RawValue::BigInt(v) => query.bind::<BigInt, _>(v),
            RawValue::Double(v) => query.bind::<Double, _>(v),
            RawValue::Text(v) => query.bind::<Text, _>(v),
            RawValue::Timestamp(v) => query.bind::<Timestamptz, _>(v),
        };
    }
    query
}

pub fn execute(conn: &mut PgConnection, sql: &str, params: &[RawValue]) -> StoreResult<usize> {
    debug!("execute_raw: {sql} ({} params)", params.len());
    Ok(bind_all(sql, params).execute(conn)?)
}

pub fn query<T>(conn: &mut PgConnection, sql: &str, params: &[RawValue]) -> StoreResult<Vec<T>>
where
    T: QueryableByName<Pg> + 'static,
{
    debug!("query_raw: {sql} ({} params)", params.len());
    Ok(bind_all(sql, params).load::<T>(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(RawValue::from("ready"), RawValue::Text("ready".into()));
        assert_eq!(RawValue::from(3), RawValue::Int(3));
        assert_eq!(RawValue::from(None::<i64>), RawValue::Null);
        assert_eq!(RawValue::from(Some(7_i64)), RawValue::BigInt(7));
    }

    #[test]
    fn test_binds_are_listed_in_order() {
        let query = bind_all(
            "SELECT id FROM \"Clip\" WHERE \"startMs\" >= $1 AND status = $2",
            &[RawValue::Int(1000), RawValue::from("ready")],
        );
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains("$1"), "{sql}");
        assert!(sql.contains("1000"), "{sql}");
        assert!(sql.contains("\"ready\""), "{sql}");
    }
}
