//! Where / orderBy / pagination inputs shared by every delegate.
//!
//! A model's `*Where` struct turns into a boxed diesel predicate for its
//! table. Scalar filters are expanded by the `*_filter!` macros below so the
//! column expressions stay concrete; the boolean combinators are generic over
//! the table.

use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::expression::BoxableExpression;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use serde::{Deserialize, Serialize};

use super::error::{StoreError, StoreResult};

pub type Condition<T> = Box<dyn BoxableExpression<T, Pg, SqlType = Bool>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Default,
    Insensitive,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFilter {
    pub equals: Option<String>,
    pub not: Option<String>,
    #[serde(rename = "in")]
    pub in_list: Option<Vec<String>>,
    pub not_in: Option<Vec<String>>,
    pub lt: Option<String>,
    pub lte: Option<String>,
    pub gt: Option<String>,
    pub gte: Option<String>,
    pub contains: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    #[serde(default)]
    pub mode: QueryMode,
}

impl StringFilter {
    pub fn equals(value: impl Into<String>) -> Self {
        Self {
            equals: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            contains: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn starts_with(value: impl Into<String>) -> Self {
        Self {
            starts_with: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            in_list: Some(values.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn insensitive(mut self) -> Self {
        self.mode = QueryMode::Insensitive;
        self
    }

    pub fn is_insensitive(&self) -> bool {
        self.mode == QueryMode::Insensitive
    }
}

/// Comparable scalar filter used for integers and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarFilter<T> {
    pub equals: Option<T>,
    pub not: Option<T>,
    #[serde(rename = "in")]
    pub in_list: Option<Vec<T>>,
    pub not_in: Option<Vec<T>>,
    pub lt: Option<T>,
    pub lte: Option<T>,
    pub gt: Option<T>,
    pub gte: Option<T>,
}

impl<T> Default for ScalarFilter<T> {
    fn default() -> Self {
        Self {
            equals: None,
            not: None,
            in_list: None,
            not_in: None,
            lt: None,
            lte: None,
            gt: None,
            gte: None,
        }
    }
}

impl<T> ScalarFilter<T> {
    pub fn equals(value: T) -> Self {
        Self {
            equals: Some(value),
            ..Default::default()
        }
    }

    pub fn gte(value: T) -> Self {
        Self {
            gte: Some(value),
            ..Default::default()
        }
    }

    pub fn lt(value: T) -> Self {
        Self {
            lt: Some(value),
            ..Default::default()
        }
    }

    pub fn between(from: T, to: T) -> Self {
        Self {
            gte: Some(from),
            lt: Some(to),
            ..Default::default()
        }
    }
}

pub type IntFilter = ScalarFilter<i32>;
pub type DateTimeFilter = ScalarFilter<DateTime<Utc>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumFilter<E> {
    pub equals: Option<E>,
    pub not: Option<E>,
    #[serde(rename = "in")]
    pub in_list: Option<Vec<E>>,
    pub not_in: Option<Vec<E>>,
}

impl<E> Default for EnumFilter<E> {
    fn default() -> Self {
        Self {
            equals: None,
            not: None,
            in_list: None,
            not_in: None,
        }
    }
}

impl<E> EnumFilter<E> {
    pub fn equals(value: E) -> Self {
        Self {
            equals: Some(value),
            ..Default::default()
        }
    }

    pub fn one_of(values: Vec<E>) -> Self {
        Self {
            in_list: Some(values),
            ..Default::default()
        }
    }

    pub fn not(value: E) -> Self {
        Self {
            not: Some(value),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolFilter {
    pub equals: Option<bool>,
    pub not: Option<bool>,
}

impl BoolFilter {
    pub fn equals(value: bool) -> Self {
        Self {
            equals: Some(value),
            not: None,
        }
    }
}

/// Filter on a nullable column. `is_null` is checked first; the inner filter
/// never matches NULL values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nullable<F> {
    pub is_null: Option<bool>,
    #[serde(flatten)]
    pub value: F,
}

impl<F: Default> Default for Nullable<F> {
    fn default() -> Self {
        Self {
            is_null: None,
            value: F::default(),
        }
    }
}

impl<F: Default> Nullable<F> {
    pub fn is_null() -> Self {
        Self {
            is_null: Some(true),
            value: F::default(),
        }
    }

    pub fn is_not_null() -> Self {
        Self {
            is_null: Some(false),
            value: F::default(),
        }
    }

    pub fn matching(value: F) -> Self {
        Self {
            is_null: None,
            value,
        }
    }
}

pub type NullableStringFilter = Nullable<StringFilter>;
pub type NullableIntFilter = Nullable<IntFilter>;
pub type NullableDateTimeFilter = Nullable<DateTimeFilter>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F> OrderBy<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }
}

/// Arguments shared by `find_many` and `find_first`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindManyArgs<W, F> {
    pub filter: W,
    pub order_by: Vec<OrderBy<F>>,
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

impl<W: Default, F> Default for FindManyArgs<W, F> {
    fn default() -> Self {
        Self {
            filter: W::default(),
            order_by: Vec::new(),
            skip: None,
            take: None,
        }
    }
}

impl<W: Default, F> FindManyArgs<W, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: W) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, order: OrderBy<F>) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: i64) -> Self {
        self.take = Some(take);
        self
    }
}

impl<W, F> FindManyArgs<W, F> {
    pub fn validate(&self) -> StoreResult<()> {
        if self.skip.is_some_and(|s| s < 0) {
            return Err(StoreError::validation("skip must not be negative"));
        }
        if self.take.is_some_and(|t| t < 0) {
            return Err(StoreError::validation("take must not be negative"));
        }
        Ok(())
    }
}

/// Escapes LIKE wildcards so user input matches literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn always_true<T: 'static>() -> Condition<T> {
    Box::new(sql::<Bool>("TRUE"))
}

pub fn all_of<T: 'static>(conditions: Vec<Condition<T>>) -> Option<Condition<T>> {
    conditions
        .into_iter()
        .reduce(|acc, next| Box::new(acc.and(next)) as Condition<T>)
}

pub fn any_of<T: 'static>(conditions: Vec<Condition<T>>) -> Option<Condition<T>> {
    conditions
        .into_iter()
        .reduce(|acc, next| Box::new(acc.or(next)) as Condition<T>)
}

pub fn negate<T: 'static>(condition: Condition<T>) -> Condition<T> {
    Box::new(diesel::dsl::not(condition))
}

pub fn or_true<T: 'static>(condition: Option<Condition<T>>) -> Condition<T> {
    condition.unwrap_or_else(always_true)
}

/// Appends the AND / OR / NOT lists of a `*Where` input.
///
/// An empty `or` list is treated as absent.
pub fn push_nested<T: 'static, W>(
    conditions: &mut Vec<Condition<T>>,
    and: &[W],
    or: &[W],
    not: &[W],
    to_condition: impl Fn(&W) -> Option<Condition<T>>,
) {
    conditions.extend(and.iter().filter_map(&to_condition));
    let branches: Vec<Condition<T>> = or
        .iter()
        .map(|w| or_true(to_condition(w)))
        .collect();
    if let Some(branch) = any_of(branches) {
        conditions.push(branch);
    }
    // `NOT {}` negates match-everything, so it matches nothing.
    conditions.extend(not.iter().map(|w| negate(or_true(to_condition(w)))));
}

macro_rules! string_filter {
    ($conditions:ident, $column:expr, $filter:expr) => {{
        #[allow(unused_imports)]
        use diesel::prelude::*;
        let f: &$crate::core::shared::filters::StringFilter = $filter;
        if let Some(v) = &f.equals {
            if f.is_insensitive() {
                $conditions.push(Box::new($column.ilike($crate::core::shared::filters::escape_like(v))));
            } else {
                $conditions.push(Box::new($column.eq(v.clone())));
            }
        }
        if let Some(v) = &f.not {
            if f.is_insensitive() {
                $conditions.push(Box::new($column.not_ilike($crate::core::shared::filters::escape_like(v))));
            } else {
                $conditions.push(Box::new($column.ne(v.clone())));
            }
        }
        if let Some(v) = &f.in_list {
            $conditions.push(Box::new($column.eq_any(v.clone())));
        }
        if let Some(v) = &f.not_in {
            $conditions.push(Box::new($column.ne_all(v.clone())));
        }
        if let Some(v) = &f.lt {
            $conditions.push(Box::new($column.lt(v.clone())));
        }
        if let Some(v) = &f.lte {
            $conditions.push(Box::new($column.le(v.clone())));
        }
        if let Some(v) = &f.gt {
            $conditions.push(Box::new($column.gt(v.clone())));
        }
        if let Some(v) = &f.gte {
            $conditions.push(Box::new($column.ge(v.clone())));
        }
        let patterns = [
            f.contains
                .as_ref()
                .map(|v| format!("%{}%", $crate::core::shared::filters::escape_like(v))),
            f.starts_with
                .as_ref()
                .map(|v| format!("{}%", $crate::core::shared::filters::escape_like(v))),
            f.ends_with
                .as_ref()
                .map(|v| format!("%{}", $crate::core::shared::filters::escape_like(v))),
        ];
        for pattern in patterns.into_iter().flatten() {
            if f.is_insensitive() {
                $conditions.push(Box::new($column.ilike(pattern)));
            } else {
                $conditions.push(Box::new($column.like(pattern)));
            }
        }
    }};
}

macro_rules! scalar_filter {
    ($conditions:ident, $column:expr, $filter:expr) => {{
        #[allow(unused_imports)]
        use diesel::prelude::*;
        let f = $filter;
        if let Some(v) = &f.equals {
            $conditions.push(Box::new($column.eq(v.clone())));
        }
        if let Some(v) = &f.not {
            $conditions.push(Box::new($column.ne(v.clone())));
        }
        if let Some(v) = &f.in_list {
            $conditions.push(Box::new($column.eq_any(v.clone())));
        }
        if let Some(v) = &f.not_in {
            $conditions.push(Box::new($column.ne_all(v.clone())));
        }
        if let Some(v) = &f.lt {
            $conditions.push(Box::new($column.lt(v.clone())));
        }
        if let Some(v) = &f.lte {
            $conditions.push(Box::new($column.le(v.clone())));
        }
        if let Some(v) = &f.gt {
            $conditions.push(Box::new($column.gt(v.clone())));
        }
        if let Some(v) = &f.gte {
            $conditions.push(Box::new($column.ge(v.clone())));
        }
    }};
}

macro_rules! enum_filter {
    ($conditions:ident, $column:expr, $filter:expr) => {{
        #[allow(unused_imports)]
        use diesel::prelude::*;
        let f = $filter;
        if let Some(v) = f.equals {
            $conditions.push(Box::new($column.eq(v)));
        }
        if let Some(v) = f.not {
            $conditions.push(Box::new($column.ne(v)));
        }
        if let Some(v) = &f.in_list {
            $conditions.push(Box::new($column.eq_any(v.clone())));
        }
        if let Some(v) = &f.not_in {
            $conditions.push(Box::new($column.ne_all(v.clone())));
        }
    }};
}

macro_rules! bool_filter {
    ($conditions:ident, $column:expr, $filter:expr) => {{
        #[allow(unused_imports)]
        use diesel::prelude::*;
        let f: &$crate::core::shared::filters::BoolFilter = $filter;
        if let Some(v) = f.equals {
            $conditions.push(Box::new($column.eq(v)));
        }
        if let Some(v) = f.not {
            $conditions.push(Box::new($column.ne(v)));
        }
    }};
}

/// Nullable column: `$column` is the raw column, the inner filter runs on its
/// non-null projection.
macro_rules! nullable_filter {
    ($kind:ident, $conditions:ident, $column:expr, $filter:expr) => {{
        #[allow(unused_imports)]
        use diesel::prelude::*;
        let f = $filter;
        match f.is_null {
            Some(true) => $conditions.push(Box::new($column.is_null())),
            Some(false) => $conditions.push(Box::new($column.is_not_null())),
            None => {}
        }
        $crate::core::shared::filters::$kind!($conditions, $column.assume_not_null(), &f.value);
    }};
}

pub(crate) use bool_filter;
pub(crate) use enum_filter;
pub(crate) use nullable_filter;
pub(crate) use scalar_filter;
pub(crate) use string_filter;
