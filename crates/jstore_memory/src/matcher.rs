//! Filter evaluation against decoded documents.

use jstore_core::{
    CompareOp, Comparison, Document, QueryOption, QueryValue, StoreError, StoreResult,
};

/// Returns true if the document satisfies every filter in `options`.
///
/// All filters are evaluated even after one has failed, so a clause that
/// cannot be evaluated against this document is reported no matter where it
/// appears. Sort options are ignored.
///
/// # Errors
///
/// Returns [`StoreError::MissingProperty`] or [`StoreError::PropertyType`]
/// if a compared property is absent or of the wrong type, and
/// [`StoreError::UnsupportedQuery`] for an operator the value type does not
/// support.
pub(crate) fn evaluate(
    id: &str,
    document: &Document,
    options: &[QueryOption],
) -> StoreResult<bool> {
    let mut matched = true;
    for option in options {
        let hit = match option {
            QueryOption::Id(wanted) => id == wanted,
            QueryOption::Compare(comparison) => compare(document, comparison)?,
            QueryOption::Sort(_) => continue,
        };
        matched &= hit;
    }
    Ok(matched)
}

fn compare(document: &Document, comparison: &Comparison) -> StoreResult<bool> {
    let property = comparison.property.as_str();
    match &comparison.value {
        QueryValue::String(wanted) => {
            if comparison.op != CompareOp::Eq {
                return Err(StoreError::unsupported(format!(
                    "operator {} is not supported for string property '{property}'",
                    comparison.op
                )));
            }
            Ok(document.text(property)? == wanted.as_str())
        }
        QueryValue::DateTime(wanted) => {
            let stored = document.timestamp(property)?;
            Ok(comparison.op.test(&stored, wanted))
        }
        QueryValue::Integer(wanted) => {
            let stored = document.number(property)?;
            Ok(comparison.op.test(&stored, &(*wanted as f64)))
        }
        QueryValue::Float(wanted) => {
            let stored = document.number(property)?;
            Ok(comparison.op.test(&stored, wanted))
        }
    }
}
