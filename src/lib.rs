//! Sprint Update - periodic status report generator
//!
//! Fetches a report through an external command, memoizes it in a file-backed
//! TTL cache, and delivers it to the clipboard as rich text or markdown.

pub mod cache;
pub mod clipboard;
pub mod config;
pub mod delivery;
pub mod error;
pub mod render;
pub mod report;

pub use cache::{CacheStore, Memoizer, SystemClock};
pub use clipboard::{Clipboard, ClipboardPayload, SystemClipboard};
pub use config::Config;
pub use delivery::{DeliveryChoice, DeliveryPrompt};
pub use report::{fetch_cached, CommandReportSource, ReportSource, ReportWindow};
