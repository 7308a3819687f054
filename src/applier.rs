//! Applies one [`ChangeSpec`] to the shared document buffer.
//!
//! The guard is evaluated before the anchor: a change whose effect is already
//! present must be a no-op, and must not duplicate insertion-style edits whose
//! replacement embeds the anchor inside itself. A missing anchor is a soft
//! failure — it signals the document's shape drifted from what the change
//! expects, not that the run should stop.

use crate::buffer::{Document, ReplaceOutcome};
use crate::change::ChangeSpec;
use std::fmt;

/// Minimum similarity for a document line to be offered as a drift hint.
const HINT_THRESHOLD: f64 = 0.6;

/// The tagged result of attempting one change. Produced once per change per
/// run and never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Outcome should be collected into the session report"]
pub struct Outcome {
    /// Id of the change this outcome belongs to.
    pub id: String,
    /// The change's human-readable description.
    pub summary: String,
    pub kind: OutcomeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The anchor was found and substituted.
    Applied { replaced: usize },
    /// The guard matched: the change's effect already exists.
    AlreadyPresent,
    /// Neither guard nor anchor matched: the document has drifted.
    AnchorNotFound {
        /// The document line most similar to the anchor, when one is close
        /// enough to be worth reporting.
        hint: Option<String>,
    },
}

impl Outcome {
    /// Fixed severity prefix for report lines.
    pub fn prefix(&self) -> &'static str {
        match self.kind {
            OutcomeKind::Applied { .. } => "OK",
            OutcomeKind::AlreadyPresent => "INFO",
            OutcomeKind::AnchorNotFound { .. } => "WARN",
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.kind, OutcomeKind::Applied { .. })
    }

    pub fn is_already_present(&self) -> bool {
        matches!(self.kind, OutcomeKind::AlreadyPresent)
    }

    pub fn is_anchor_not_found(&self) -> bool {
        matches!(self.kind, OutcomeKind::AnchorNotFound { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OutcomeKind::Applied { .. } => write!(f, "OK {}", self.summary),
            OutcomeKind::AlreadyPresent => write!(f, "INFO {} (already present)", self.summary),
            OutcomeKind::AnchorNotFound { .. } => {
                write!(f, "WARN {}: anchor not found", self.summary)
            }
        }
    }
}

/// Evaluate the guard, substitute if needed, classify the result.
///
/// The document is mutated only on the `Applied` path.
pub fn apply(doc: &mut Document, spec: &ChangeSpec) -> Outcome {
    if doc.contains(&spec.guard) {
        return Outcome {
            id: spec.id.clone(),
            summary: spec.summary.clone(),
            kind: OutcomeKind::AlreadyPresent,
        };
    }

    let kind = match doc.replace(&spec.anchor, &spec.replacement, spec.occurrence) {
        ReplaceOutcome::Replaced { count } => OutcomeKind::Applied { replaced: count },
        ReplaceOutcome::NotFound => OutcomeKind::AnchorNotFound {
            hint: nearest_line(doc.render(), &spec.anchor),
        },
    };

    Outcome {
        id: spec.id.clone(),
        summary: spec.summary.clone(),
        kind,
    }
}

/// Find the document line most similar to the anchor's first non-blank line.
///
/// Drift diagnostics only: when an anchor misses, the closest surviving line
/// usually shows what the document now looks like (reformatted, renamed, or
/// manually edited).
fn nearest_line(text: &str, anchor: &str) -> Option<String> {
    let probe = anchor.lines().map(str::trim).find(|l| !l.is_empty())?;

    let mut best: Option<(f64, &str)> = None;
    for line in text.lines() {
        let candidate = line.trim();
        if candidate.is_empty() {
            continue;
        }
        let score = strsim::normalized_levenshtein(probe, candidate);
        if best.map_or(true, |(b, _)| score > b) {
            best = Some((score, candidate));
        }
    }

    best.filter(|(score, _)| *score >= HINT_THRESHOLD)
        .map(|(_, line)| line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Occurrence;

    fn insert_y_after_x() -> ChangeSpec {
        ChangeSpec::new("add-y", "Add Y after X", "X", "X\nY", "Y")
    }

    #[test]
    fn test_apply_inserts_and_reports_applied() {
        let mut doc = Document::new("X");
        let outcome = apply(&mut doc, &insert_y_after_x());
        assert!(outcome.is_applied());
        assert_eq!(outcome.prefix(), "OK");
        assert_eq!(doc.render(), "X\nY");
    }

    #[test]
    fn test_guard_short_circuits_before_anchor() {
        // Second run over already-patched text: the anchor still matches
        // (the replacement embeds it), so only the guard prevents a
        // duplicate insertion.
        let mut doc = Document::new("X\nY");
        let before = doc.fingerprint();
        let outcome = apply(&mut doc, &insert_y_after_x());
        assert!(outcome.is_already_present());
        assert_eq!(outcome.prefix(), "INFO");
        assert_eq!(doc.fingerprint(), before);
    }

    #[test]
    fn test_missing_anchor_is_soft_and_leaves_document_unchanged() {
        let mut doc = Document::new("unrelated content");
        let before = doc.fingerprint();
        let outcome = apply(&mut doc, &insert_y_after_x());
        assert!(outcome.is_anchor_not_found());
        assert_eq!(outcome.prefix(), "WARN");
        assert_eq!(doc.fingerprint(), before);
    }

    #[test]
    fn test_drift_hint_points_at_nearest_line() {
        let spec = ChangeSpec::new(
            "filter",
            "Add Variant Title filter",
            r#"{ value: "sku", label: "SKU", type: "text" },"#,
            r#"{ value: "sku", label: "SKU", type: "text" }, extra"#,
            "extra",
        );
        // The document carries a reformatted version of the anchor line.
        let mut doc = Document::new(
            "const FILTER_FIELDS = [\n  { value: \"sku\", label: \"Sku\", type: \"text\" },\n];\n",
        );
        let outcome = apply(&mut doc, &spec);
        match outcome.kind {
            OutcomeKind::AnchorNotFound { hint: Some(hint) } => {
                assert!(hint.contains("sku"));
            }
            other => panic!("expected a drift hint, got {other:?}"),
        }
    }

    #[test]
    fn test_no_hint_when_nothing_is_close() {
        let spec = insert_y_after_x();
        let mut doc = Document::new("completely different document body\n");
        let outcome = apply(&mut doc, &spec);
        assert_eq!(
            outcome.kind,
            OutcomeKind::AnchorNotFound { hint: None }
        );
    }

    #[test]
    fn test_report_lines_carry_severity_prefix_and_summary() {
        let mut fresh = Document::new("X");
        let applied = apply(&mut fresh, &insert_y_after_x());
        assert_eq!(applied.to_string(), "OK Add Y after X");

        let mut patched = Document::new("X\nY");
        let present = apply(&mut patched, &insert_y_after_x());
        assert_eq!(present.to_string(), "INFO Add Y after X (already present)");

        let mut drifted = Document::new("unrelated");
        let missed = apply(&mut drifted, &insert_y_after_x());
        assert_eq!(missed.to_string(), "WARN Add Y after X: anchor not found");
    }

    #[test]
    fn test_replace_all_reports_count() {
        let spec = ChangeSpec::new("upd", "Rewrite endpoint", "v1/api", "v2/api", "v2/api")
            .with_occurrence(Occurrence::All);
        let mut doc = Document::new("v1/api v1/api v1/api");
        let outcome = apply(&mut doc, &spec);
        assert_eq!(outcome.kind, OutcomeKind::Applied { replaced: 3 });
    }
}
