//! Ordering of matched documents by one property.

use chrono::{DateTime, Utc};
use jstore_core::query::parse_timestamp;
use jstore_core::{Document, PropertyValue, SortOrder, StoreError, StoreResult};
use std::cmp::Ordering;

enum SortKey {
    Number(f64),
    Time(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Keys are built with a single variant per sort.
            _ => Ordering::Equal,
        }
    }
}

/// Sorts `items` by `order.property` of each item's document.
///
/// The kind of the first item's value decides how the whole set is ordered:
/// numbers numerically, strings chronologically when every one of them is a
/// timestamp and lexicographically otherwise. The sort is stable, so items
/// with equal keys keep their incoming order.
///
/// # Errors
///
/// Returns [`StoreError::MissingProperty`] if an item lacks the property,
/// [`StoreError::PropertyType`] if kinds differ between items, and
/// [`StoreError::UnsupportedQuery`] for properties that are neither strings
/// nor numbers.
pub(crate) fn sort_by_property<T>(
    items: &mut Vec<T>,
    order: &SortOrder,
    document: impl Fn(&T) -> &Document,
) -> StoreResult<()> {
    let Some(first) = items.first() else {
        return Ok(());
    };
    let property = order.property.as_str();

    let keys: Vec<SortKey> = match document(first).require(property)? {
        PropertyValue::Number(_) => items
            .iter()
            .map(|item| document(item).number(property).map(SortKey::Number))
            .collect::<StoreResult<_>>()?,
        PropertyValue::Text(_) => {
            let texts = items
                .iter()
                .map(|item| document(item).text(property).map(str::to_owned))
                .collect::<StoreResult<Vec<_>>>()?;
            let times: Option<Vec<_>> = texts.iter().map(|t| parse_timestamp(t)).collect();
            match times {
                Some(times) => times.into_iter().map(SortKey::Time).collect(),
                None => texts.into_iter().map(SortKey::Text).collect(),
            }
        }
        PropertyValue::Other(kind) => {
            return Err(StoreError::unsupported(format!(
                "cannot sort on property '{property}' of type {kind}"
            )));
        }
    };

    let mut keyed: Vec<(SortKey, T)> = keys.into_iter().zip(items.drain(..)).collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = a.compare(b);
        if order.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    items.extend(keyed.into_iter().map(|(_, item)| item));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(bodies: &[&str]) -> Vec<(usize, Document)> {
        bodies
            .iter()
            .enumerate()
            .map(|(i, body)| (i, Document::parse(body).unwrap()))
            .collect()
    }

    fn sorted(bodies: &[&str], property: &str, ascending: bool) -> StoreResult<Vec<usize>> {
        let mut items = docs(bodies);
        let order = SortOrder {
            property: property.to_string(),
            ascending,
        };
        sort_by_property(&mut items, &order, |(_, doc)| doc)?;
        Ok(items.into_iter().map(|(i, _)| i).collect())
    }

    #[test]
    fn numbers_sort_numerically() {
        let bodies = [r#"{"n":10}"#, r#"{"n":2}"#, r#"{"n":-1.5}"#];
        assert_eq!(sorted(&bodies, "n", true).unwrap(), vec![2, 1, 0]);
        assert_eq!(sorted(&bodies, "n", false).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn strings_sort_lexicographically() {
        let bodies = [r#"{"s":"b"}"#, r#"{"s":"a"}"#, r#"{"s":"c"}"#];
        assert_eq!(sorted(&bodies, "s", true).unwrap(), vec![1, 0, 2]);
    }

    #[test]
    fn timestamps_sort_chronologically() {
        let bodies = [
            r#"{"t":"2001-01-01T00:00:00Z"}"#,
            r#"{"t":"1999-12-31T23:00:00-05:00"}"#,
            r#"{"t":"2000-01-01T01:00:00Z"}"#,
        ];
        // As plain text "1999..." sorts first, but it is 2000-01-01T04:00Z.
        assert_eq!(sorted(&bodies, "t", true).unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn one_non_timestamp_falls_back_to_text() {
        let bodies = [r#"{"t":"2001-01-01T00:00:00Z"}"#, r#"{"t":"later"}"#];
        assert_eq!(sorted(&bodies, "t", false).unwrap(), vec![1, 0]);
    }

    #[test]
    fn ties_keep_incoming_order() {
        let bodies = [r#"{"n":1}"#, r#"{"n":0}"#, r#"{"n":1}"#, r#"{"n":1}"#];
        assert_eq!(sorted(&bodies, "n", true).unwrap(), vec![1, 0, 2, 3]);
        assert_eq!(sorted(&bodies, "n", false).unwrap(), vec![0, 2, 3, 1]);
    }

    #[test]
    fn missing_property_fails() {
        let bodies = [r#"{"n":1}"#, r#"{"m":0}"#];
        let err = sorted(&bodies, "n", true).unwrap_err();
        assert!(matches!(err, StoreError::MissingProperty { .. }));
    }

    #[test]
    fn mixed_kinds_fail() {
        let bodies = [r#"{"n":1}"#, r#"{"n":"1"}"#];
        let err = sorted(&bodies, "n", true).unwrap_err();
        assert!(matches!(err, StoreError::PropertyType { .. }));
    }

    #[test]
    fn unsortable_kinds_fail() {
        let bodies = [r#"{"b":true}"#];
        let err = sorted(&bodies, "b", true).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedQuery { .. }));
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(sorted(&[], "anything", true).unwrap().is_empty());
    }
}
