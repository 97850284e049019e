//! File stream channel
//!
//! Records are written as one flattened JSON object per line by the
//! `tracing_subscriber` JSON formatter. The target file is opened in append
//! mode and created if missing.

use super::{threshold_filter, BoxedLayer};
use calltrail_core::Level;
use calltrail_errors::{CalltrailError, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::Layer;

/// Open `path` for appending
///
/// # Errors
///
/// Returns an `Io` error if the file cannot be created or opened.
pub fn open_target(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            CalltrailError::StreamOpen {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
}

pub(crate) fn layer(file: File, threshold: Level) -> BoxedLayer {
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(Mutex::new(file))
        .with_filter(threshold_filter(threshold))
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calltrail_errors::LogErrorKind;

    #[test]
    fn test_open_target_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.log");

        open_target(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_target_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");

        let err = open_target(&path).unwrap_err();
        assert_eq!(err.kind(), LogErrorKind::Io);
        assert_eq!(err.op(), Some("open_stream"));
        assert_eq!(err.path(), Some(path.as_path()));
    }
}
