//! Ordered application of a change set over one shared document.
//!
//! Later changes observe the effects of earlier ones: a change's anchor may
//! be text that an earlier change in the same run inserted. The runner never
//! short-circuits on a missed anchor — a drifted target for one change must
//! not prevent independent changes from being patched. Best-effort over
//! all-or-nothing, deliberately.

use crate::applier::{apply, Outcome};
use crate::buffer::Document;
use crate::change::ChangeSpec;
use crate::store::{StoreError, TextStore};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What a pure run produces: the rendered document plus one outcome per
/// change, in change order. Persistence is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RunOutput carries the rendered text; dropping it loses the run"]
pub struct RunOutput {
    pub final_text: String,
    pub report: SessionReport,
}

/// Ordered outcome report for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionReport {
    outcomes: Vec<Outcome>,
}

impl SessionReport {
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Count of changes that substituted text this run.
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn already_present(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_already_present())
            .count()
    }

    pub fn missing(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_anchor_not_found())
            .count()
    }

    /// True when any anchor failed to match: the target's shape no longer
    /// agrees with at least one change in the set.
    pub fn drifted(&self) -> bool {
        self.missing() > 0
    }
}

/// Run every change, in order, against one document built from `initial_text`.
///
/// Pure with respect to its input and output text: no I/O, no shared state
/// across runs.
pub fn run(initial_text: impl Into<String>, specs: &[ChangeSpec]) -> RunOutput {
    let mut doc = Document::new(initial_text);

    let outcomes = specs.iter().map(|spec| apply(&mut doc, spec)).collect();

    RunOutput {
        final_text: doc.into_text(),
        report: SessionReport { outcomes },
    }
}

/// Fatal session failures. Per-change misses are outcomes, never errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The input text could not be obtained; nothing ran.
    #[error("cannot start session for {target}: {source}")]
    Source {
        target: PathBuf,
        source: StoreError,
    },

    /// The rendered text could not be written back. The rendered document is
    /// retained here so a caller can still recover it.
    #[error("session for {target} completed but could not be persisted: {source}")]
    Persistence {
        target: PathBuf,
        rendered: String,
        report: SessionReport,
        source: StoreError,
    },
}

/// One load → run → persist cycle over a [`TextStore`].
///
/// Loads the document exactly once at session start and writes it back
/// exactly once at session end.
pub struct PatchSession<S: TextStore> {
    store: S,
}

impl<S: TextStore> PatchSession<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Apply `specs` to the document identified by `target` and persist the
    /// result. Returns the outcome report; the report's WARN entries do not
    /// make the session fail.
    pub fn run(&self, target: &Path, specs: &[ChangeSpec]) -> Result<SessionReport, SessionError> {
        let output = self.preview(target, specs)?;

        if let Err(source) = self.store.save_text(target, &output.final_text) {
            return Err(SessionError::Persistence {
                target: target.to_path_buf(),
                rendered: output.final_text,
                report: output.report,
                source,
            });
        }

        Ok(output.report)
    }

    /// Evaluate `specs` without persisting. Backs dry-run and status
    /// reporting; the stored document is never touched.
    pub fn preview(&self, target: &Path, specs: &[ChangeSpec]) -> Result<RunOutput, SessionError> {
        let initial = self
            .store
            .load_text(target)
            .map_err(|source| SessionError::Source {
                target: target.to_path_buf(),
                source,
            })?;

        Ok(run(initial, specs))
    }
}
