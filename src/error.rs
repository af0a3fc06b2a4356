//! Typed errors for inspection-side failures
//!
//! Host-hook failures are never represented here: the interceptor forwards
//! them untouched. These cover only the crate's own recoverable conditions.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectError {
    /// A resolve chain ran past the recursion bound; almost certainly a
    /// cycle introduced by the host pipeline.
    #[error("resolve chain for `{id}` exceeded {limit} redirects")]
    ResolveDepthExceeded { id: String, limit: usize },

    /// Writing one report artifact failed. Other artifacts are unaffected.
    #[error("failed to write report artifact `{path}`: {source}")]
    ReportArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The entry specification was none of the recognized shapes. Callers
    /// treat this as "no entries to report".
    #[error("unsupported entry specification shape: {found}")]
    UnsupportedEntrySpec { found: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InspectError::ResolveDepthExceeded {
            id: "virtual:a".to_string(),
            limit: 64,
        };
        assert!(err.to_string().contains("virtual:a"));
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn test_report_artifact_keeps_source() {
        use std::error::Error as _;
        let err = InspectError::ReportArtifact {
            path: PathBuf::from("/tmp/out/list.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }
}
