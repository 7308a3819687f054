use crate::buffer::Occurrence;

/// A declarative edit against one target document.
///
/// The anchor is literal text expected to exist before the change; the guard
/// is literal text whose presence means the change's effect already exists.
/// For insertion-style changes the replacement embeds the anchor, so the
/// guard is what makes repeated runs safe: without it a second run would
/// duplicate the inserted fragment.
///
/// # Guard discipline
///
/// The engine trusts the guard as given. A guard that matches pre-existing,
/// unrelated text makes the change permanently skipped; a guard that does not
/// appear in the applied text makes every re-run insert again. Choose guard
/// text precise enough to avoid both. The statically checkable half (guard
/// must occur in the replacement) is enforced by config validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSpec {
    /// Stable label for reporting.
    pub id: String,
    /// Human-readable description, used verbatim in report lines.
    pub summary: String,
    /// Literal text expected to exist in the document before the change.
    pub anchor: String,
    /// Literal text substituted for the anchor.
    pub replacement: String,
    /// Literal text whose presence means the change was already applied.
    pub guard: String,
    /// Whether to replace the first occurrence or every occurrence.
    pub occurrence: Occurrence,
    /// Ids of changes in the same set whose inserted text this change's
    /// anchor or guard relies on. Declared explicitly rather than left to
    /// list order alone; validated at load time.
    pub depends_on: Vec<String>,
}

impl ChangeSpec {
    /// A replace-first change with no declared dependencies.
    pub fn new(
        id: impl Into<String>,
        summary: impl Into<String>,
        anchor: impl Into<String>,
        replacement: impl Into<String>,
        guard: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            anchor: anchor.into(),
            replacement: replacement.into(),
            guard: guard.into(),
            occurrence: Occurrence::First,
            depends_on: Vec::new(),
        }
    }

    /// Insertion-style change: the anchor stays in place and `addition` is
    /// appended directly after it. The most common shape in practice.
    pub fn insert_after(
        id: impl Into<String>,
        summary: impl Into<String>,
        anchor: impl Into<String>,
        addition: impl AsRef<str>,
        guard: impl Into<String>,
    ) -> Self {
        let anchor = anchor.into();
        let replacement = format!("{}{}", anchor, addition.as_ref());
        Self::new(id, summary, anchor, replacement, guard)
    }

    pub fn with_occurrence(mut self, occurrence: Occurrence) -> Self {
        self.occurrence = occurrence;
        self
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }
}
