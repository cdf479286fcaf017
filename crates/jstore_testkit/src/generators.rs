//! Property-based test generators using proptest.
//!
//! Provides strategies for ids, documents and query values that stay inside
//! what every backend accepts.

use chrono::{DateTime, Utc};
use jstore_core::query::format_timestamp;
use jstore_core::{CompareOp, QueryValue};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for generating document ids.
pub fn document_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,15}").expect("Invalid regex")
}

/// Strategy for generating project and document type names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{0,15}").expect("Invalid regex")
}

/// Strategy for generating timestamps with whole seconds between 1970 and 2100.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800)
        .prop_map(|secs| DateTime::from_timestamp(secs, 0).expect("timestamp in range"))
}

/// Strategy for generating documents with a numeric `score`, a string
/// `label` and a timestamp `at`.
pub fn scored_document_strategy() -> impl Strategy<Value = Value> {
    (
        -1_000i64..1_000,
        prop::string::string_regex("[a-z]{1,8}").expect("Invalid regex"),
        timestamp_strategy(),
    )
        .prop_map(|(score, label, at)| {
            json!({
                "score": score,
                "label": label,
                "at": format_timestamp(&at),
            })
        })
}

/// Strategy for generating a batch of scored documents keyed by distinct ids,
/// sorted by id. `max_documents` must be at least 2.
pub fn scored_collection_strategy(
    max_documents: usize,
) -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map(
        document_id_strategy(),
        scored_document_strategy(),
        1..max_documents,
    )
    .prop_map(|docs| docs.into_iter().collect())
}

/// Strategy for generating comparison operators.
pub fn compare_op_strategy() -> impl Strategy<Value = CompareOp> {
    prop_oneof![
        Just(CompareOp::Eq),
        Just(CompareOp::Lt),
        Just(CompareOp::Lte),
        Just(CompareOp::Gt),
        Just(CompareOp::Gte),
    ]
}

/// Strategy for generating query values of every kind.
pub fn query_value_strategy() -> impl Strategy<Value = QueryValue> {
    prop_oneof![
        prop::string::string_regex("[a-z]{0,8}")
            .expect("Invalid regex")
            .prop_map(QueryValue::String),
        any::<i64>().prop_map(QueryValue::Integer),
        (-1.0e6f64..1.0e6).prop_map(QueryValue::Float),
        timestamp_strategy().prop_map(QueryValue::DateTime),
    ]
}

/// A single store operation.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Save a document
    Save {
        /// Document id
        id: String,
        /// Document body
        body: Value,
    },
    /// Delete a document
    Delete {
        /// Document id
        id: String,
    },
    /// Load a document
    Get {
        /// Document id
        id: String,
    },
}

/// Strategy for generating store operations over a small id space, so
/// operations collide often.
pub fn store_operation_strategy() -> impl Strategy<Value = StoreOperation> {
    let id = prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string);
    prop_oneof![
        3 => (id.clone(), scored_document_strategy())
            .prop_map(|(id, body)| StoreOperation::Save { id, body }),
        1 => id.clone().prop_map(|id| StoreOperation::Delete { id }),
        2 => id.prop_map(|id| StoreOperation::Get { id }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
