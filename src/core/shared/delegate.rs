//! Per-model operation set shared by every table.
//!
//! `model_delegate!` expands to a `*Delegate<'c>` struct borrowing a
//! connection, an order-by field enum and the find / create / update / delete
//! / count operations. Model-specific extras (group-bys, relation loading,
//! alternate unique keys) live next to the invocation. The invoking module
//! must import `diesel::prelude::*`.

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::Serialize;

/// `_avg`, `_sum`, `_min` and `_max` of one integer column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericAggregate {
    pub avg: Option<f64>,
    pub sum: Option<i64>,
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl NumericAggregate {
    pub fn new(
        avg: Option<BigDecimal>,
        sum: Option<i64>,
        min: Option<i32>,
        max: Option<i32>,
    ) -> Self {
        Self {
            avg: avg.and_then(|v| v.to_f64()),
            sum,
            min,
            max,
        }
    }
}

/// One row of a single-key group-by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount<K> {
    pub key: K,
    pub count: i64,
}

impl<K> From<(K, i64)> for GroupCount<K> {
    fn from((key, count): (K, i64)) -> Self {
        Self { key, count }
    }
}

macro_rules! model_delegate {
    (
        $(#[$meta:meta])*
        $delegate:ident {
            model: $model:literal,
            table: $table:ident,
            row: $row:ty,
            create: $create:ty,
            update: $update:ty,
            filter: $filter:ty,
            upsert_on: ($($conflict:ident),+),
            order: $order:ident { $($variant:ident => $column:ident),+ $(,)? } $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum $order {
            $($variant),+
        }

        impl $order {
            fn apply(
                self,
                query: $table::BoxedQuery<'static, diesel::pg::Pg>,
                order: $crate::core::shared::filters::SortOrder,
            ) -> $table::BoxedQuery<'static, diesel::pg::Pg> {
                use $crate::core::shared::filters::SortOrder;
                match (self, order) {
                    $(
                        (Self::$variant, SortOrder::Asc) => query.then_order_by($table::$column.asc()),
                        (Self::$variant, SortOrder::Desc) => query.then_order_by($table::$column.desc()),
                    )+
                }
            }
        }

        $(#[$meta])*
        pub struct $delegate<'c> {
            conn: &'c mut diesel::PgConnection,
        }

        impl<'c> $delegate<'c> {
            pub const MODEL: &'static str = $model;

            pub fn new(conn: &'c mut diesel::PgConnection) -> Self {
                Self { conn }
            }

            fn conn(&mut self) -> &mut diesel::PgConnection {
                self.conn
            }

            fn boxed_query(
                args: &$crate::core::shared::filters::FindManyArgs<$filter, $order>,
            ) -> $crate::core::shared::error::StoreResult<$table::BoxedQuery<'static, diesel::pg::Pg>> {
                args.validate()?;
                let mut query: $table::BoxedQuery<'static, diesel::pg::Pg> = $table::table.into_boxed();
                if let Some(condition) = args.filter.to_condition() {
                    query = query.filter(condition);
                }
                for order in &args.order_by {
                    query = order.field.apply(query, order.order);
                }
                if let Some(skip) = args.skip {
                    query = query.offset(skip);
                }
                if let Some(take) = args.take {
                    query = query.limit(take);
                }
                Ok(query)
            }

            pub fn find_unique(&mut self, id: &str) -> $crate::core::shared::error::StoreResult<Option<$row>> {
                let result = $table::table.find(id).first::<$row>(self.conn()).optional();
                $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)
            }

            pub fn find_unique_or_throw(&mut self, id: &str) -> $crate::core::shared::error::StoreResult<$row> {
                let result = $table::table.find(id).first::<$row>(self.conn());
                $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)
            }

            pub fn find_first(
                &mut self,
                args: &$crate::core::shared::filters::FindManyArgs<$filter, $order>,
            ) -> $crate::core::shared::error::StoreResult<Option<$row>> {
                let result = Self::boxed_query(args)?.first::<$row>(self.conn()).optional();
                $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)
            }

            pub fn find_first_or_throw(
                &mut self,
                args: &$crate::core::shared::filters::FindManyArgs<$filter, $order>,
            ) -> $crate::core::shared::error::StoreResult<$row> {
                self.find_first(args)?
                    .ok_or($crate::core::shared::error::StoreError::NotFound { model: Self::MODEL })
            }

            pub fn find_many(
                &mut self,
                args: &$crate::core::shared::filters::FindManyArgs<$filter, $order>,
            ) -> $crate::core::shared::error::StoreResult<Vec<$row>> {
                let query = Self::boxed_query(args)?;
                log::debug!(
                    "{}: {}",
                    Self::MODEL,
                    diesel::debug_query::<diesel::pg::Pg, _>(&query)
                );
                let result = query.load::<$row>(self.conn());
                $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)
            }

            pub fn create(&mut self, data: $create) -> $crate::core::shared::error::StoreResult<$row> {
                $crate::core::shared::validate::Validate::validate(&data)?;
                let result = diesel::insert_into($table::table)
                    .values(&data)
                    .get_result::<$row>(self.conn());
                let row = $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)?;
                log::info!("Created {} {}", Self::MODEL, row.id);
                Ok(row)
            }

            /// Inserts every row and returns how many were written. With
            /// `skip_duplicates`, rows hitting a unique constraint are skipped.
            pub fn create_many(
                &mut self,
                data: Vec<$create>,
                skip_duplicates: bool,
            ) -> $crate::core::shared::error::StoreResult<usize> {
                for item in &data {
                    $crate::core::shared::validate::Validate::validate(item)?;
                }
                if data.is_empty() {
                    return Ok(0);
                }
                let insert = diesel::insert_into($table::table).values(&data);
                let result = if skip_duplicates {
                    insert.on_conflict_do_nothing().execute(self.conn())
                } else {
                    insert.execute(self.conn())
                };
                let count = $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)?;
                log::info!("Created {count} {} rows", Self::MODEL);
                Ok(count)
            }

            pub fn create_many_and_return(
                &mut self,
                data: Vec<$create>,
                skip_duplicates: bool,
            ) -> $crate::core::shared::error::StoreResult<Vec<$row>> {
                for item in &data {
                    $crate::core::shared::validate::Validate::validate(item)?;
                }
                if data.is_empty() {
                    return Ok(Vec::new());
                }
                let insert = diesel::insert_into($table::table).values(&data);
                let result = if skip_duplicates {
                    insert.on_conflict_do_nothing().get_results::<$row>(self.conn())
                } else {
                    insert.get_results::<$row>(self.conn())
                };
                let rows = $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)?;
                log::info!("Created {} {} rows", rows.len(), Self::MODEL);
                Ok(rows)
            }

            /// Empty changes return the current row untouched.
            pub fn update(
                &mut self,
                id: &str,
                mut changes: $update,
            ) -> $crate::core::shared::error::StoreResult<$row> {
                use $crate::core::shared::validate::{Changes, Validate};
                changes.validate()?;
                if changes.is_empty() {
                    return self.find_unique_or_throw(id);
                }
                changes.touch(chrono::Utc::now());
                let result = diesel::update($table::table.find(id))
                    .set(&changes)
                    .get_result::<$row>(self.conn());
                $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)
            }

            pub fn update_many(
                &mut self,
                filter: &$filter,
                mut changes: $update,
            ) -> $crate::core::shared::error::StoreResult<usize> {
                use $crate::core::shared::validate::{Changes, Validate};
                changes.validate()?;
                if changes.is_empty() {
                    return Ok(0);
                }
                changes.touch(chrono::Utc::now());
                let condition = $crate::core::shared::filters::or_true(filter.to_condition());
                let result = diesel::update($table::table.filter(condition))
                    .set(&changes)
                    .execute(self.conn());
                $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)
            }

            pub fn update_many_and_return(
                &mut self,
                filter: &$filter,
                mut changes: $update,
            ) -> $crate::core::shared::error::StoreResult<Vec<$row>> {
                use $crate::core::shared::validate::{Changes, Validate};
                changes.validate()?;
                if changes.is_empty() {
                    return Ok(Vec::new());
                }
                changes.touch(chrono::Utc::now());
                let condition = $crate::core::shared::filters::or_true(filter.to_condition());
                let result = diesel::update($table::table.filter(condition))
                    .set(&changes)
                    .get_results::<$row>(self.conn());
                $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)
            }

            /// Inserts `create`, or applies `changes` to the row already holding
            /// its unique key. Empty changes leave an existing row as it is.
            #[allow(unused_parens)]
            pub fn upsert(
                &mut self,
                create: $create,
                mut changes: $update,
            ) -> $crate::core::shared::error::StoreResult<$row> {
                use diesel::upsert::excluded;
                use $crate::core::shared::validate::{Changes, Validate};
                create.validate()?;
                changes.validate()?;
                let insert = diesel::insert_into($table::table)
                    .values(&create)
                    .on_conflict(($($table::$conflict),+))
                    .do_update();
                let result = if changes.is_empty() {
                    insert
                        .set(($($table::$conflict.eq(excluded($table::$conflict))),+))
                        .get_result::<$row>(self.conn())
                } else {
                    changes.touch(chrono::Utc::now());
                    insert.set(&changes).get_result::<$row>(self.conn())
                };
                $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)
            }

            pub fn delete(&mut self, id: &str) -> $crate::core::shared::error::StoreResult<$row> {
                let result = diesel::delete($table::table.find(id)).get_result::<$row>(self.conn());
                let row = $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)?;
                log::info!("Deleted {} {}", Self::MODEL, row.id);
                Ok(row)
            }

            pub fn delete_many(&mut self, filter: &$filter) -> $crate::core::shared::error::StoreResult<usize> {
                let condition = $crate::core::shared::filters::or_true(filter.to_condition());
                let result = diesel::delete($table::table.filter(condition)).execute(self.conn());
                let count = $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)?;
                log::info!("Deleted {count} {} rows", Self::MODEL);
                Ok(count)
            }

            pub fn count(&mut self, filter: &$filter) -> $crate::core::shared::error::StoreResult<i64> {
                let condition = $crate::core::shared::filters::or_true(filter.to_condition());
                let result = $table::table
                    .filter(condition)
                    .count()
                    .get_result::<i64>(self.conn());
                $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)
            }
        }
    };
}

/// Adds `aggregate(filter)` over the listed integer columns to a delegate.
macro_rules! model_aggregate {
    ($delegate:ident, $table:ident, $filter:ty, $aggregate:ident { $($field:ident),+ $(,)? }) => {
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
        pub struct $aggregate {
            pub count: i64,
            $(pub $field: $crate::core::shared::delegate::NumericAggregate,)+
        }

        impl<'c> $delegate<'c> {
            pub fn aggregate(&mut self, filter: &$filter) -> $crate::core::shared::error::StoreResult<$aggregate> {
                let mut aggregate = $aggregate {
                    count: self.count(filter)?,
                    ..Default::default()
                };
                $(
                    let condition = $crate::core::shared::filters::or_true(filter.to_condition());
                    let result = $table::table
                        .filter(condition)
                        .select((
                            diesel::dsl::avg($table::$field),
                            diesel::dsl::sum($table::$field),
                            diesel::dsl::min($table::$field),
                            diesel::dsl::max($table::$field),
                        ))
                        .get_result::<(Option<bigdecimal::BigDecimal>, Option<i64>, Option<i32>, Option<i32>)>(
                            self.conn(),
                        );
                    let (field_avg, field_sum, field_min, field_max) =
                        $crate::core::shared::error::ModelContext::for_model(result, Self::MODEL)?;
                    aggregate.$field = $crate::core::shared::delegate::NumericAggregate::new(
                        field_avg, field_sum, field_min, field_max,
                    );
                )+
                Ok(aggregate)
            }
        }
    };
}

pub(crate) use model_aggregate;
pub(crate) use model_delegate;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_numeric_aggregate_converts_avg() {
        let agg = NumericAggregate::new(
            Some(BigDecimal::from_str("1250.5").unwrap()),
            Some(2501),
            Some(1000),
            Some(1501),
        );
        assert_eq!(agg.avg, Some(1250.5));
        assert_eq!(agg.sum, Some(2501));
        assert_eq!(NumericAggregate::new(None, None, None, None), NumericAggregate::default());
    }

    #[test]
    fn test_group_count_from_tuple() {
        let group: GroupCount<&str> = ("ready", 3).into();
        assert_eq!(group.key, "ready");
        assert_eq!(group.count, 3);
    }
}
