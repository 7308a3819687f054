use crate::buffer::Occurrence;
use crate::change::ChangeSpec;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// A change-set file: one target document plus the ordered changes to apply
/// to it in a single session.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ChangeSetConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub changes: Vec<ChangeEntry>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Semver range of app versions this set applies to.
    #[serde(default)]
    pub version_range: Option<String>,
    /// The target document, one per change set.
    #[serde(default)]
    pub file: String,
    /// When true, `file` is resolved against the project root.
    #[serde(default)]
    pub project_relative: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChangeEntry {
    pub id: String,
    /// Human-readable description used in report lines. Falls back to the
    /// id when omitted.
    #[serde(default)]
    pub summary: Option<String>,
    pub anchor: String,
    pub replacement: String,
    pub guard: String,
    #[serde(default)]
    pub occurrences: OccurrenceSpec,
    /// Ids of earlier changes in this set whose inserted text this change
    /// relies on.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceSpec {
    #[default]
    First,
    All,
}

impl From<OccurrenceSpec> for Occurrence {
    fn from(spec: OccurrenceSpec) -> Self {
        match spec {
            OccurrenceSpec::First => Occurrence::First,
            OccurrenceSpec::All => Occurrence::All,
        }
    }
}

impl ChangeSetConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.changes.is_empty() {
            issues.push(ValidationIssue::EmptyChangeList);
        }

        if self.meta.file.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                change_id: None,
                field: "meta.file",
            });
        }

        let mut seen_ids: HashSet<&str> = HashSet::new();

        for change in &self.changes {
            if change.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    change_id: None,
                    field: "id",
                });
            } else if !seen_ids.insert(change.id.as_str()) {
                issues.push(ValidationIssue::InvalidCombo {
                    change_id: Some(change.id.clone()),
                    message: "duplicate change id".to_string(),
                });
            }

            for (field, value) in [
                ("anchor", &change.anchor),
                ("replacement", &change.replacement),
                ("guard", &change.guard),
            ] {
                if value.is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        change_id: Some(change.id.clone()),
                        field,
                    });
                }
            }

            // A guard that never appears in the applied text can never
            // recognize success; every re-run would insert again.
            if !change.guard.is_empty()
                && !change.replacement.is_empty()
                && !change.replacement.contains(&change.guard)
            {
                issues.push(ValidationIssue::InvalidCombo {
                    change_id: Some(change.id.clone()),
                    message: "guard marker does not appear in replacement text".to_string(),
                });
            }

            for dep in &change.depends_on {
                if dep == &change.id {
                    issues.push(ValidationIssue::InvalidCombo {
                        change_id: Some(change.id.clone()),
                        message: "change depends on itself".to_string(),
                    });
                } else if !seen_ids.contains(dep.as_str()) {
                    // Forward and unknown references are the same defect: a
                    // dependency must already have run when this change does.
                    issues.push(ValidationIssue::InvalidCombo {
                        change_id: Some(change.id.clone()),
                        message: format!("depends_on '{dep}' is not an earlier change in this set"),
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Resolve the target document path for this set.
    pub fn target_path(&self, project_root: &Path) -> PathBuf {
        if self.meta.project_relative {
            project_root.join(&self.meta.file)
        } else {
            PathBuf::from(&self.meta.file)
        }
    }

    /// Convert the declarative entries into engine change specs, preserving
    /// order. Assumes `validate` has passed.
    pub fn to_specs(&self) -> Vec<ChangeSpec> {
        self.changes
            .iter()
            .map(|entry| ChangeSpec {
                id: entry.id.clone(),
                summary: entry
                    .summary
                    .clone()
                    .unwrap_or_else(|| entry.id.clone()),
                anchor: entry.anchor.clone(),
                replacement: entry.replacement.clone(),
                guard: entry.guard.clone(),
                occurrence: entry.occurrences.into(),
                depends_on: entry.depends_on.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyChangeList,
    MissingField {
        change_id: Option<String>,
        field: &'static str,
    },
    InvalidCombo {
        change_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyChangeList => write!(f, "change set contains no changes"),
            ValidationIssue::MissingField { change_id, field } => match change_id {
                Some(id) => write!(f, "change '{id}' missing required field '{field}'"),
                None => write!(f, "change set missing required field '{field}'"),
            },
            ValidationIssue::InvalidCombo { change_id, message } => match change_id {
                Some(id) => write!(f, "change '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid change set configuration: {message}"),
            },
        }
    }
}
