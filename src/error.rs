use std::path::PathBuf;

use thiserror::Error;

/// Failure kinds of the extraction pipeline.
///
/// `DocumentRead` is always fatal and `NotFound` fails the single-student
/// commands. A bulk index logs `UnresolvedGeometry` and `ReferenceLoad`,
/// records them in the run manifest and carries on.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("student {roll_number} not found in {source_name}")]
    NotFound {
        roll_number: String,
        source_name: String,
    },

    #[error("no table geometry found for student {roll_number} ({location})")]
    UnresolvedGeometry {
        roll_number: String,
        location: String,
    },

    #[error("failed to load reference file {}: {reason}", path.display())]
    ReferenceLoad { path: PathBuf, reason: String },

    #[error("failed to read document {}: {reason}", path.display())]
    DocumentRead { path: PathBuf, reason: String },
}
