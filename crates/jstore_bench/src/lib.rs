//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use jstore_core::{EntityId, Store, StoreResult};
use serde_json::json;

/// Generates a scored document whose properties vary with `n`.
pub fn scored_document(n: usize) -> String {
    json!({
        "score": (n * 7919) % 1000,
        "label": format!("item-{n:06}"),
        "at": format!("20{:02}-01-01T00:00:00Z", n % 100),
    })
    .to_string()
}

/// Generates a JSON document padded to roughly `size` bytes.
pub fn padded_document(size: usize) -> String {
    json!({ "score": size, "payload": "x".repeat(size) }).to_string()
}

/// Saves `count` scored documents into `project`/`document_type`.
pub fn populate<S: Store + ?Sized>(
    store: &S,
    project: &str,
    document_type: &str,
    count: usize,
) -> StoreResult<()> {
    for n in 0..count {
        store.save(
            &EntityId::new(project, document_type, format!("doc-{n}")),
            &scored_document(n),
        )?;
    }
    Ok(())
}
