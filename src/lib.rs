//! Patchwright: idempotent text patching for generated application source.
//!
//! Given a target text document and an ordered list of declarative changes,
//! the engine applies each change exactly once, detects when a change's
//! effect is already present (so repeated runs are safe), and reports a
//! per-change outcome.
//!
//! # Architecture
//!
//! Everything reduces to literal substring operations on one in-memory
//! [`Document`]. A [`ChangeSpec`] names an anchor (text expected to exist),
//! a replacement, and a guard marker (text whose presence means the change
//! already happened). The [`runner`] feeds an ordered change set through the
//! [`applier`] against a single shared buffer, so later changes can anchor
//! on text earlier changes inserted.
//!
//! # Idempotency
//!
//! - The guard is evaluated before the anchor; a matched guard is a no-op
//! - Replacement text is never re-scanned for further matches
//! - A missed anchor is a soft failure: the run continues
//! - Atomic file writes (tempfile + fsync + rename)
//!
//! # Limitations
//!
//! Matching is exact literal text, deliberately. The engine never parses the
//! target document's grammar, so it is fragile to incidental reformatting —
//! anchors are text, not structural selectors. That trade keeps the contract
//! simple and the failure mode visible (a WARN line, never a mangled edit).
//!
//! # Example
//!
//! ```
//! use patchwright::{run, ChangeSpec};
//!
//! let spec = ChangeSpec::new(
//!     "add-marker",
//!     "Add marker line after header",
//!     "// header",
//!     "// header\n// marker",
//!     "// marker",
//! );
//!
//! let first = run("// header\nbody\n", &[spec.clone()]);
//! assert_eq!(first.report.applied(), 1);
//!
//! let second = run(first.final_text.clone(), &[spec]);
//! assert_eq!(second.report.applied(), 0);
//! assert_eq!(second.final_text, first.final_text);
//! ```

pub mod applier;
pub mod buffer;
pub mod change;
pub mod config;
pub mod runner;
pub mod safety;
pub mod store;

// Re-exports
pub use applier::{apply, Outcome, OutcomeKind};
pub use buffer::{Document, Occurrence, ReplaceOutcome};
pub use change::ChangeSpec;
pub use config::{
    load_from_path, load_from_str, matches_requirement, ChangeSetConfig, ConfigError,
    ValidationError, VersionError,
};
pub use runner::{run, PatchSession, RunOutput, SessionError, SessionReport};
pub use safety::{ProjectGuard, SafetyError};
pub use store::{FsTextStore, StoreError, TextStore};
