//! Preview session errors

use abtest_model::{TestId, VariantId};
use std::path::PathBuf;

/// Preview session failures
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Session file could not be read or written
    #[error("session store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored overrides are not valid JSON for this version
    #[error("session store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Overrides could not be encoded
    #[error("cannot encode overrides: {0}")]
    Encode(#[source] serde_json::Error),

    /// Forced variant is not part of the test
    #[error("variant {variant} is not part of test {test}")]
    UnknownVariant { test: TestId, variant: VariantId },

    /// Session used before `load`
    #[error("preview session has not been loaded")]
    NotLoaded,
}

impl PreviewError {
    /// True if resetting the session would clear the failure
    #[inline]
    #[must_use]
    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}
