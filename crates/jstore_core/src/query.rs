//! Query options: the backend-agnostic filter and sort vocabulary.
//!
//! A query is a slice of [`QueryOption`]s. Filters combine conjunctively;
//! a [`SortOrder`] orders the matches before any result limit is applied.
//!
//! ```
//! use jstore_core::query::{desc, eq, gt, id};
//!
//! let by_id = [id("ford")];
//! let oldest_adults = [gt("age", 17), eq("planet", "Earth"), desc("age")];
//! # let _ = (by_id, oldest_adults);
//! ```

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Parses a stored timestamp (RFC 3339, e.g. `2042-01-01T00:00:00Z`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Renders a timestamp the way it is expected to be stored.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// A typed query value. Its variant decides the comparison semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Exact string match.
    String(String),
    /// Integer, compared numerically against stored numbers.
    Integer(i64),
    /// Floating point, compared numerically against stored numbers.
    Float(f64),
    /// Point in time, compared chronologically against stored timestamps.
    DateTime(DateTime<Utc>),
}

impl QueryValue {
    /// Name of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryValue::String(_) => "string",
            QueryValue::Integer(_) => "integer",
            QueryValue::Float(_) => "float",
            QueryValue::DateTime(_) => "datetime",
        }
    }

    /// Returns the numeric value as `f64` for integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            QueryValue::Integer(n) => Some(*n as f64),
            QueryValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::String(s) => write!(f, "{s:?}"),
            QueryValue::Integer(n) => write!(f, "{n}"),
            QueryValue::Float(x) => write!(f, "{x}"),
            QueryValue::DateTime(t) => f.write_str(&format_timestamp(t)),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::String(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::String(s)
    }
}

macro_rules! integer_query_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for QueryValue {
                fn from(n: $t) -> Self {
                    QueryValue::Integer(i64::from(n))
                }
            }
        )*
    };
}

integer_query_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for QueryValue {
    fn from(x: f32) -> Self {
        QueryValue::Float(f64::from(x))
    }
}

impl From<f64> for QueryValue {
    fn from(x: f64) -> Self {
        QueryValue::Float(x)
    }
}

impl From<DateTime<Utc>> for QueryValue {
    fn from(t: DateTime<Utc>) -> Self {
        QueryValue::DateTime(t)
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
}

impl CompareOp {
    /// Returns the operator symbol.
    pub const fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }

    /// Applies the operator to two ordered values (`stored op query`).
    pub fn test<T: PartialOrd + ?Sized>(self, stored: &T, query: &T) -> bool {
        match self {
            CompareOp::Eq => stored == query,
            CompareOp::Lt => stored < query,
            CompareOp::Lte => stored <= query,
            CompareOp::Gt => stored > query,
            CompareOp::Gte => stored >= query,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompareOp {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s {
            "=" => Ok(CompareOp::Eq),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Lte),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Gte),
            other => Err(StoreError::unsupported(format!(
                "unsupported compare option: {other}"
            ))),
        }
    }
}

/// A comparison of a top-level document property against a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Top-level property name.
    pub property: String,
    /// Operator, applied as `stored <op> value`.
    pub op: CompareOp,
    /// Value to compare against.
    pub value: QueryValue,
}

/// Result ordering directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    /// Top-level property to order by.
    pub property: String,
    /// Ascending when true, descending otherwise.
    pub ascending: bool,
}

/// One query directive.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOption {
    /// Exact match on the document id.
    Id(String),
    /// Property comparison.
    Compare(Comparison),
    /// Ordering of the results. Not a filter.
    Sort(SortOrder),
}

impl QueryOption {
    /// Returns true for filters (everything except sort).
    pub fn is_filter(&self) -> bool {
        !matches!(self, QueryOption::Sort(_))
    }
}

/// Returns the effective sort of a query. The last sort option wins.
pub fn effective_sort(options: &[QueryOption]) -> Option<&SortOrder> {
    options.iter().rev().find_map(|o| match o {
        QueryOption::Sort(s) => Some(s),
        _ => None,
    })
}

/// Matches the document with the given id.
pub fn id(value: impl Into<String>) -> QueryOption {
    QueryOption::Id(value.into())
}

/// Builds a comparison option.
pub fn compare(
    property: impl Into<String>,
    op: CompareOp,
    value: impl Into<QueryValue>,
) -> QueryOption {
    QueryOption::Compare(Comparison {
        property: property.into(),
        op,
        value: value.into(),
    })
}

/// `property = value`
pub fn eq(property: impl Into<String>, value: impl Into<QueryValue>) -> QueryOption {
    compare(property, CompareOp::Eq, value)
}

/// `property < value`
pub fn lt(property: impl Into<String>, value: impl Into<QueryValue>) -> QueryOption {
    compare(property, CompareOp::Lt, value)
}

/// `property <= value`
pub fn lte(property: impl Into<String>, value: impl Into<QueryValue>) -> QueryOption {
    compare(property, CompareOp::Lte, value)
}

/// `property > value`
pub fn gt(property: impl Into<String>, value: impl Into<QueryValue>) -> QueryOption {
    compare(property, CompareOp::Gt, value)
}

/// `property >= value`
pub fn gte(property: impl Into<String>, value: impl Into<QueryValue>) -> QueryOption {
    compare(property, CompareOp::Gte, value)
}

/// Orders results by `property`.
pub fn sort(property: impl Into<String>, ascending: bool) -> QueryOption {
    QueryOption::Sort(SortOrder {
        property: property.into(),
        ascending,
    })
}

/// Orders results by `property`, smallest first.
pub fn asc(property: impl Into<String>) -> QueryOption {
    sort(property, true)
}

/// Orders results by `property`, largest first.
pub fn desc(property: impl Into<String>) -> QueryOption {
    sort(property, false)
}

/// Backend construction option, interpreted only by the chosen provider.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreOption {
    /// A successful write is visible to reads before the write call returns.
    SyncUpdates,
    /// Network timeout for backends that talk to a server.
    Timeout(Duration),
    /// Backend-specific setting.
    Param {
        /// Setting name.
        key: String,
        /// Setting value.
        value: String,
    },
}

impl StoreOption {
    /// Creates a backend-specific setting.
    pub fn param(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Param {
            key: key.into(),
            value: value.into(),
        }
    }
}
