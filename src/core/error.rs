//! Error taxonomy for batch generation.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Pipeline step an item was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compose,
    WriteImage,
    WriteMetadata,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Compose => "compose",
            Stage::WriteImage => "write image",
            Stage::WriteMetadata => "write metadata",
        })
    }
}

/// Failures raised by an [`ImageComposer`](crate::rendering::composer::ImageComposer).
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("font has no glyph for {0:?}")]
    MissingGlyph(char),
}

#[derive(Error, Debug)]
pub enum GenError {
    /// Malformed configuration handed to a sampler or the composer.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Font or output directory cannot be used.
    #[error("{resource} unavailable at {}: {reason}", .path.display())]
    ResourceUnavailable {
        resource: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("item {index}: {stage} failed for {}: {source}", .path.display())]
    Io {
        index: usize,
        stage: Stage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("item {index}: {} failed: {source}", Stage::Compose)]
    Compose {
        index: usize,
        #[source]
        source: ComposeError,
    },

    #[error("clearing {} failed: {source}", .path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl GenError {
    /// Index of the item that failed, when the failure is item-scoped.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            GenError::Io { index, .. } | GenError::Compose { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_item_and_stage() {
        let err = GenError::Io {
            index: 7,
            stage: Stage::WriteMetadata,
            path: PathBuf::from("out/7-meta.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("item 7"), "{msg}");
        assert!(msg.contains("write metadata"), "{msg}");
        assert_eq!(err.item_index(), Some(7));
    }

    #[test]
    fn non_item_errors_have_no_index() {
        assert_eq!(GenError::InvalidArgument("x".into()).item_index(), None);
    }
}
