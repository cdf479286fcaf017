//! Compiles query options into the cluster's query DSL.

use jstore_core::query::{effective_sort, format_timestamp};
use jstore_core::{
    CompareOp, Comparison, QueryOption, QueryValue, SortOrder, StoreError, StoreResult,
};
use serde_json::{json, Value};

/// How the sort property is mapped in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Sort on the property itself (numbers, dates, keywords).
    Plain,
    /// Sort on the property's keyword sub-field (analyzed text).
    Keyword,
}

/// Builds a search body from query options.
///
/// Filters become `bool.filter` clauses, so they are conjunctive and do not
/// score. Without filters the query is `match_all`. The last sort option
/// wins; `sort_field` says whether it targets the keyword sub-field. Hits
/// carry `_version`, `_seq_no` and `_primary_term`.
///
/// # Errors
///
/// Returns [`StoreError::UnsupportedQuery`] for a string comparison other
/// than equality.
pub fn compile_query(
    options: &[QueryOption],
    max_results: usize,
    keyword_suffix: &str,
    sort_field: SortField,
) -> StoreResult<Value> {
    let mut filters = Vec::new();
    for option in options {
        match option {
            QueryOption::Id(id) => filters.push(json!({ "ids": { "values": [id] } })),
            QueryOption::Compare(comparison) => {
                filters.push(compile_comparison(comparison, keyword_suffix)?);
            }
            QueryOption::Sort(_) => {}
        }
    }

    let query = if filters.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "bool": { "filter": filters } })
    };

    let mut body = json!({
        "query": query,
        "size": max_results,
        "version": true,
        "seq_no_primary_term": true,
    });
    if let Some(order) = effective_sort(options) {
        body["sort"] = compile_sort(order, keyword_suffix, sort_field);
    }
    Ok(body)
}

fn compile_comparison(comparison: &Comparison, keyword_suffix: &str) -> StoreResult<Value> {
    let property = comparison.property.as_str();
    let (field, value) = match &comparison.value {
        QueryValue::String(s) => {
            if comparison.op != CompareOp::Eq {
                return Err(StoreError::unsupported(format!(
                    "operator {} is not supported for string property '{property}'",
                    comparison.op
                )));
            }
            (format!("{property}{keyword_suffix}"), json!(s))
        }
        QueryValue::Integer(n) => (property.to_string(), json!(n)),
        QueryValue::Float(x) => (property.to_string(), json!(x)),
        QueryValue::DateTime(t) => (property.to_string(), json!(format_timestamp(t))),
    };

    let range_key = match comparison.op {
        CompareOp::Eq => return Ok(json!({ "term": { field: value } })),
        CompareOp::Lt => "lt",
        CompareOp::Lte => "lte",
        CompareOp::Gt => "gt",
        CompareOp::Gte => "gte",
    };
    Ok(json!({ "range": { field: { range_key: value } } }))
}

fn compile_sort(order: &SortOrder, keyword_suffix: &str, sort_field: SortField) -> Value {
    let field = match sort_field {
        SortField::Plain => order.property.clone(),
        SortField::Keyword => format!("{}{keyword_suffix}", order.property),
    };
    let direction = if order.ascending { "asc" } else { "desc" };
    json!([{ field: { "order": direction } }])
}
