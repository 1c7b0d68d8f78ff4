//! Clipboard Platform Module
//!
//! Capability check for the OS clipboard pipeline.

use std::fmt;

// == Clipboard Platform ==
/// Whether the current OS can run the clipboard pipeline.
///
/// Only macOS ships both `pbcopy` and `textutil`. On any other OS plain copy
/// fails with `UnsupportedPlatform` and rich copy falls back to plain copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardPlatform {
    Supported,
    Unsupported,
}

impl ClipboardPlatform {
    /// Detects the capability of the OS this binary was built for.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            ClipboardPlatform::Supported
        } else {
            ClipboardPlatform::Unsupported
        }
    }

    pub fn is_supported(self) -> bool {
        self == ClipboardPlatform::Supported
    }
}

impl fmt::Display for ClipboardPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardPlatform::Supported => write!(f, "supported ({})", std::env::consts::OS),
            ClipboardPlatform::Unsupported => write!(f, "unsupported ({})", std::env::consts::OS),
        }
    }
}
