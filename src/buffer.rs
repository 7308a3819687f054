use xxhash_rust::xxh3::xxh3_64;

/// How many occurrences of an anchor a substitution may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Occurrence {
    /// Replace only the first (leftmost) occurrence.
    #[default]
    First,
    /// Replace every non-overlapping occurrence.
    All,
}

/// Result of a [`Document::replace`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "ReplaceOutcome should be checked for NotFound"]
pub enum ReplaceOutcome {
    /// The anchor does not occur; the document was left untouched.
    NotFound,
    /// The anchor was substituted `count` times.
    Replaced { count: usize },
}

/// The full text of one target file, held in memory for the duration of a run.
///
/// The buffer wraps externally supplied text verbatim: no normalization, no
/// encoding transformation. Matching depends on literal equality, so
/// whitespace and exact character sequences are preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    /// Wrap source text without modification.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Exact literal substring containment test. Never a regular expression:
    /// the target document is machine-generated and its literal shape is
    /// already known by the caller, so metacharacters in code fragments must
    /// not change meaning.
    pub fn contains(&self, pattern: &str) -> bool {
        self.text.contains(pattern)
    }

    /// Substitute `replacement` for `anchor`.
    ///
    /// Scans left to right exactly once. Inserted replacement text is never
    /// re-scanned, so a replacement that contains the anchor as a substring
    /// is not re-processed.
    pub fn replace(
        &mut self,
        anchor: &str,
        replacement: &str,
        occurrence: Occurrence,
    ) -> ReplaceOutcome {
        // An empty anchor would match at every position. The config loader
        // rejects empty anchors; this is the in-engine backstop.
        if anchor.is_empty() {
            return ReplaceOutcome::NotFound;
        }

        let mut out = String::with_capacity(self.text.len() + replacement.len());
        let mut rest = self.text.as_str();
        let mut count = 0usize;

        while let Some(idx) = rest.find(anchor) {
            out.push_str(&rest[..idx]);
            out.push_str(replacement);
            rest = &rest[idx + anchor.len()..];
            count += 1;
            if occurrence == Occurrence::First {
                break;
            }
        }

        if count == 0 {
            return ReplaceOutcome::NotFound;
        }

        out.push_str(rest);
        self.text = out;
        ReplaceOutcome::Replaced { count }
    }

    /// Current full text, for persistence.
    pub fn render(&self) -> &str {
        &self.text
    }

    /// Consume the buffer, yielding the final text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// xxh3 hash of the current content. Cheap byte-identity check for
    /// idempotency assertions and re-run reporting.
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(self.text.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
