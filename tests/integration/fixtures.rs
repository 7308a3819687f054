//! Shared helpers for replaying the shipped change sets against mock
//! documents built from their own anchors.

use patchwright::config::{load_from_path, ChangeSetConfig};
use std::path::PathBuf;

/// Load one of the change sets shipped in `changesets/`.
pub fn load_change_set(name: &str) -> ChangeSetConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("changesets")
        .join(name);
    load_from_path(&path).expect("shipped change set should load")
}

/// Build a mock target document that contains every anchor of the set, in
/// declaration order, separated by inert filler. Mirrors the shape of the
/// generated route file closely enough for literal matching.
pub fn mock_document(config: &ChangeSetConfig) -> String {
    let mut doc = String::from("// mock generated route\n");
    for change in &config.changes {
        doc.push_str(&change.anchor);
        doc.push_str("\n\n// ----\n\n");
    }
    doc
}

/// Same as [`mock_document`] but with one change's anchor left out, to
/// simulate a target that drifted for exactly that change.
pub fn mock_document_without(config: &ChangeSetConfig, skip_id: &str) -> String {
    let mut doc = String::from("// mock generated route\n");
    for change in &config.changes {
        if change.id == skip_id {
            continue;
        }
        doc.push_str(&change.anchor);
        doc.push_str("\n\n// ----\n\n");
    }
    doc
}
