//! Clipboard Module
//!
//! Delivers plain or rich text to the OS clipboard.
//!
//! The rich-text path runs a fixed pipeline on supported platforms:
//!
//! ```text
//! create temp .html -> textutil -convert rtf -> pbcopy -> remove temp
//! ```
//!
//! The temporary artifact is removed on every exit path once created.

mod artifact;
mod platform;
mod tools;

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{ClipboardError, ClipboardResult};

pub use artifact::{TempArtifact, ARTIFACT_PREFIX};
pub use platform::ClipboardPlatform;
pub use tools::{ClipboardTools, ToolCommand, INPUT_PLACEHOLDER};

// == Clipboard Payload ==
/// Content for a rich-text copy: the HTML to convert, and the plain text
/// used when rich delivery is not available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub html: String,
    pub text: String,
}

impl ClipboardPayload {
    pub fn new(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            text: text.into(),
        }
    }
}

// == Clipboard Port ==
/// Destination for copied report content.
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Copies plain text.
    async fn copy_text(&self, text: &str) -> ClipboardResult<()>;

    /// Copies HTML as rich text, degrading to `payload.text` where rich
    /// delivery is unavailable.
    async fn copy_rich_text(&self, payload: &ClipboardPayload) -> ClipboardResult<()>;
}

// == System Clipboard ==
/// Clipboard backed by OS utilities.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    platform: ClipboardPlatform,
    tools: ClipboardTools,
    temp_dir: PathBuf,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClipboard {
    /// Creates a clipboard for the detected platform with the default tools,
    /// placing artifacts in the system temp directory.
    pub fn new() -> Self {
        Self {
            platform: ClipboardPlatform::detect(),
            tools: ClipboardTools::default(),
            temp_dir: std::env::temp_dir(),
        }
    }

    pub fn with_platform(mut self, platform: ClipboardPlatform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_tools(mut self, tools: ClipboardTools) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn platform(&self) -> ClipboardPlatform {
        self.platform
    }

    /// Runs the rich-text pipeline. Early returns drop the artifact, which
    /// removes the file.
    async fn convert_and_copy(&self, html: &str) -> ClipboardResult<()> {
        let artifact = TempArtifact::create(&self.temp_dir, html)?;
        let rich = tools::run_capture(&self.tools.convert, artifact.path()).await?;
        tools::pipe_into(&self.tools.copy, &rich).await?;
        artifact.release();
        Ok(())
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn copy_text(&self, text: &str) -> ClipboardResult<()> {
        if !self.platform.is_supported() {
            return Err(ClipboardError::UnsupportedPlatform);
        }

        tools::pipe_into(&self.tools.copy, text.as_bytes()).await?;
        info!(bytes = text.len(), "Copied plain text to clipboard");
        Ok(())
    }

    async fn copy_rich_text(&self, payload: &ClipboardPayload) -> ClipboardResult<()> {
        if !self.platform.is_supported() {
            debug!(platform = %self.platform, "Rich text unavailable, falling back to plain text");
            return self.copy_text(&payload.text).await;
        }

        self.convert_and_copy(&payload.html).await?;
        info!(bytes = payload.html.len(), "Copied rich text to clipboard");
        Ok(())
    }
}
