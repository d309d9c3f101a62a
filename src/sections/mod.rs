mod editor;
mod store;

pub use editor::SectionEditor;
pub use store::SectionStore;

use crate::domain::SectionId;
use std::time::Duration;

/// Recoverable failures of section and loop commands. None of these end
/// the session; callers treat them as a rejected command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SectionError {
    #[error("Section name cannot be empty")]
    EmptyName,
    #[error("Invalid range: start {start:?} must come before end {end:?}")]
    InvalidRange { start: Duration, end: Duration },
    #[error("No section with id {0}")]
    SectionNotFound(SectionId),
    #[error("No audio source is loaded")]
    SourceUnavailable,
}
