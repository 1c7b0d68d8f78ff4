//! Temporary Artifact Module
//!
//! Scoped HTML file handed to the rich-text converter. The file is removed
//! when the artifact is released or dropped, on every exit path.

use std::io::{self, Write};
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::cache::current_timestamp_ms;

/// Name prefix of every artifact; a Unix ms stamp and a random part follow
pub const ARTIFACT_PREFIX: &str = "sprint-update-";

// == Temp Artifact ==
/// A uniquely named `.html` file that deletes itself when dropped.
#[derive(Debug)]
pub struct TempArtifact {
    path: TempPath,
}

impl TempArtifact {
    /// Creates the artifact in `dir` and writes `contents` to it.
    ///
    /// The file handle is closed before returning so external programs can
    /// open the path.
    pub fn create(dir: &Path, contents: &str) -> io::Result<Self> {
        let prefix = format!("{}{}-", ARTIFACT_PREFIX, current_timestamp_ms());
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".html")
            .tempfile_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;

        let path = file.into_temp_path();
        debug!(path = %path.display(), "Created temporary artifact");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file now, logging instead of failing if that is impossible.
    pub fn release(self) {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => debug!(path = %shown, "Removed temporary artifact"),
            Err(err) => warn!(path = %shown, error = %err, "Failed to remove temporary artifact"),
        }
    }
}
