//! Clipboard Tools Module
//!
//! External utilities used by the clipboard pipeline and the helpers that
//! spawn them.

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ClipboardError, ClipboardResult};

/// Placeholder replaced by the temporary artifact path in converter args
pub const INPUT_PLACEHOLDER: &str = "{input}";

// == Tool Command ==
/// A program plus its argument template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds the process, substituting `{input}` with `input` when given.
    fn command(&self, input: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            match input {
                Some(path) if arg == INPUT_PLACEHOLDER => cmd.arg(path),
                _ => cmd.arg(arg),
            };
        }
        cmd
    }
}

// == Clipboard Tools ==
/// The copy utility and the HTML to rich text converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardTools {
    /// Reads content on stdin and loads it into the clipboard
    pub copy: ToolCommand,
    /// Reads the HTML artifact and writes rich text to stdout
    pub convert: ToolCommand,
}

impl Default for ClipboardTools {
    fn default() -> Self {
        Self {
            copy: ToolCommand::new("pbcopy", Vec::<String>::new()),
            convert: ToolCommand::new(
                "textutil",
                ["-convert", "rtf", "-format", "html", INPUT_PLACEHOLDER, "-stdout"],
            ),
        }
    }
}

// == Process Helpers ==
/// Runs `tool` on `input` and returns its stdout.
pub(crate) async fn run_capture(tool: &ToolCommand, input: &Path) -> ClipboardResult<Vec<u8>> {
    debug!(program = %tool.program, input = %input.display(), "Running converter");

    let output = tool
        .command(Some(input))
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ClipboardError::conversion(&tool.program, format!("failed to spawn: {}", e)))?;

    if !output.status.success() {
        return Err(ClipboardError::conversion(
            &tool.program,
            exit_reason(output.status, &output.stderr),
        ));
    }
    Ok(output.stdout)
}

/// Spawns `tool` and writes `data` to its stdin.
pub(crate) async fn pipe_into(tool: &ToolCommand, data: &[u8]) -> ClipboardResult<()> {
    debug!(program = %tool.program, bytes = data.len(), "Piping into clipboard utility");

    let mut child = tool
        .command(None)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ClipboardError::conversion(&tool.program, format!("failed to spawn: {}", e)))?;

    // stdin is written while stderr is drained
    let mut stdin = child.stdin.take();
    let write = async move {
        if let Some(stdin) = stdin.as_mut() {
            stdin.write_all(data).await?;
        }
        // Close stdin so the utility sees EOF
        drop(stdin);
        Ok::<(), std::io::Error>(())
    };
    let (written, output) = tokio::join!(write, child.wait_with_output());

    let output = output
        .map_err(|e| ClipboardError::conversion(&tool.program, format!("failed to wait: {}", e)))?;
    if let Err(e) = written {
        return Err(ClipboardError::conversion(
            &tool.program,
            format!("failed to write stdin: {}", e),
        ));
    }

    if output.status.success() {
        Ok(())
    } else {
        Err(ClipboardError::conversion(
            &tool.program,
            exit_reason(output.status, &output.stderr),
        ))
    }
}

fn exit_reason(status: std::process::ExitStatus, stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", status)
    } else {
        format!("exited with {}: {}", status, stderr)
    }
}
