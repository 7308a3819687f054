pub mod loader;
pub mod schema;
pub mod version;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    ChangeEntry, ChangeSetConfig, Metadata, OccurrenceSpec, ValidationError, ValidationIssue,
};
pub use version::{matches_requirement, VersionError};
