//! Delivery Prompt
//!
//! Asks how the printed report should be copied and dispatches the answer to
//! a [`Clipboard`].

use std::fmt;
use std::str::FromStr;

use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use tracing::debug;

use crate::clipboard::{Clipboard, ClipboardPayload};
use crate::error::{ClipboardError, DeliveryError, PromptError};
use crate::render::markdown_to_html;

/// Question shown above the options
pub const PROMPT_MESSAGE: &str = "Would you like to copy the report?";

// == Delivery Choice ==
/// One of the three delivery options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryChoice {
    Rich,
    Markdown,
    None,
}

impl DeliveryChoice {
    /// All options in menu order.
    pub const ALL: [DeliveryChoice; 3] = [
        DeliveryChoice::Rich,
        DeliveryChoice::Markdown,
        DeliveryChoice::None,
    ];

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            DeliveryChoice::Rich => "Copy as rich text (HTML)",
            DeliveryChoice::Markdown => "Copy as markdown",
            DeliveryChoice::None => "Don't copy",
        }
    }

    /// Stable machine value.
    pub fn value(self) -> &'static str {
        match self {
            DeliveryChoice::Rich => "rich",
            DeliveryChoice::Markdown => "markdown",
            DeliveryChoice::None => "none",
        }
    }

    /// Message to show once the copy succeeded, None when nothing was copied.
    pub fn confirmation(self) -> Option<&'static str> {
        match self {
            DeliveryChoice::Rich => Some("Report copied as rich text!"),
            DeliveryChoice::Markdown => Some("Report copied as markdown!"),
            DeliveryChoice::None => None,
        }
    }
}

impl fmt::Display for DeliveryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for DeliveryChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeliveryChoice::ALL
            .into_iter()
            .find(|choice| choice.value() == s)
            .ok_or_else(|| format!("unknown copy mode '{}' (expected rich, markdown or none)", s))
    }
}

// == Choice Prompt ==
/// Source of the user's delivery choice.
pub trait ChoicePrompt {
    fn choose(&self, message: &str, options: &[DeliveryChoice])
        -> Result<DeliveryChoice, PromptError>;
}

/// Interactive single-select menu on the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl ChoicePrompt for TerminalPrompt {
    fn choose(
        &self,
        message: &str,
        options: &[DeliveryChoice],
    ) -> Result<DeliveryChoice, PromptError> {
        let labels: Vec<&str> = options.iter().map(|choice| choice.label()).collect();

        let selected = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(|e| PromptError::Interaction(e.to_string()))?;

        // Esc or q dismisses the menu without copying
        Ok(selected
            .and_then(|index| options.get(index).copied())
            .unwrap_or(DeliveryChoice::None))
    }
}

/// Answers every prompt with the same choice. Used for `--copy`.
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub DeliveryChoice);

impl ChoicePrompt for FixedChoice {
    fn choose(&self, _: &str, _: &[DeliveryChoice]) -> Result<DeliveryChoice, PromptError> {
        Ok(self.0)
    }
}

// == Delivery Prompt ==
/// Couples a choice source with a clipboard.
#[derive(Debug)]
pub struct DeliveryPrompt<C, P> {
    clipboard: C,
    prompt: P,
}

impl<C: Clipboard, P: ChoicePrompt> DeliveryPrompt<C, P> {
    pub fn new(clipboard: C, prompt: P) -> Self {
        Self { clipboard, prompt }
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Asks for a choice and delivers `content` accordingly.
    ///
    /// Returns the choice once the copy (if any) succeeded.
    pub async fn run(&self, content: &str) -> Result<DeliveryChoice, DeliveryError> {
        let choice = self.prompt.choose(PROMPT_MESSAGE, &DeliveryChoice::ALL)?;
        debug!(choice = %choice, "Delivery option selected");

        self.deliver(choice, content).await?;
        Ok(choice)
    }

    /// Delivers `content` for an already known choice.
    pub async fn deliver(&self, choice: DeliveryChoice, content: &str) -> Result<(), ClipboardError> {
        match choice {
            DeliveryChoice::Rich => {
                let payload = ClipboardPayload::new(markdown_to_html(content), content);
                self.clipboard.copy_rich_text(&payload).await
            }
            DeliveryChoice::Markdown => self.clipboard.copy_text(content).await,
            DeliveryChoice::None => Ok(()),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Copied {
        Text(String),
        Rich(ClipboardPayload),
    }

    #[derive(Debug, Default)]
    struct RecordingClipboard {
        copies: Mutex<Vec<Copied>>,
        fail: bool,
    }

    impl RecordingClipboard {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn copies(&self) -> Vec<Copied> {
            self.copies.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Clipboard for RecordingClipboard {
        async fn copy_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::UnsupportedPlatform);
            }
            self.copies.lock().unwrap().push(Copied::Text(text.to_string()));
            Ok(())
        }

        async fn copy_rich_text(&self, payload: &ClipboardPayload) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::conversion("textutil", "exited with 1"));
            }
            self.copies.lock().unwrap().push(Copied::Rich(payload.clone()));
            Ok(())
        }
    }

    struct BrokenPrompt;

    impl ChoicePrompt for BrokenPrompt {
        fn choose(&self, _: &str, _: &[DeliveryChoice]) -> Result<DeliveryChoice, PromptError> {
            Err(PromptError::Interaction("not a terminal".to_string()))
        }
    }

    const REPORT: &str = "## Shipped\n- cache\n- clipboard";

    #[test]
    fn test_menu_labels_and_values() {
        let labels: Vec<_> = DeliveryChoice::ALL.iter().map(|c| c.label()).collect();
        let values: Vec<_> = DeliveryChoice::ALL.iter().map(|c| c.value()).collect();

        assert_eq!(
            labels,
            vec!["Copy as rich text (HTML)", "Copy as markdown", "Don't copy"]
        );
        assert_eq!(values, vec!["rich", "markdown", "none"]);
    }

    #[test]
    fn test_choice_from_str() {
        assert_eq!("rich".parse::<DeliveryChoice>(), Ok(DeliveryChoice::Rich));
        assert_eq!("none".parse::<DeliveryChoice>(), Ok(DeliveryChoice::None));
        assert!("html".parse::<DeliveryChoice>().is_err());
    }

    #[tokio::test]
    async fn test_rich_choice_renders_html() {
        let delivery = DeliveryPrompt::new(
            RecordingClipboard::default(),
            FixedChoice(DeliveryChoice::Rich),
        );

        let choice = delivery.run(REPORT).await.unwrap();

        assert_eq!(choice, DeliveryChoice::Rich);
        let copies = delivery.clipboard().copies();
        assert_eq!(copies.len(), 1);
        match &copies[0] {
            Copied::Rich(payload) => {
                assert!(payload.html.contains("<h2>Shipped</h2>"));
                assert!(payload.html.contains("<li>cache</li>"));
                assert_eq!(payload.text, REPORT);
            }
            other => panic!("expected rich copy, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_markdown_choice_copies_source_text() {
        let delivery = DeliveryPrompt::new(
            RecordingClipboard::default(),
            FixedChoice(DeliveryChoice::Markdown),
        );

        delivery.run(REPORT).await.unwrap();

        assert_eq!(
            delivery.clipboard().copies(),
            vec![Copied::Text(REPORT.to_string())]
        );
    }

    #[tokio::test]
    async fn test_none_choice_has_no_side_effect() {
        let delivery = DeliveryPrompt::new(
            RecordingClipboard::failing(),
            FixedChoice(DeliveryChoice::None),
        );

        let choice = delivery.run(REPORT).await.unwrap();

        assert_eq!(choice, DeliveryChoice::None);
        assert!(choice.confirmation().is_none());
        assert!(delivery.clipboard().copies().is_empty());
    }

    #[tokio::test]
    async fn test_clipboard_failure_propagates() {
        let delivery = DeliveryPrompt::new(
            RecordingClipboard::failing(),
            FixedChoice(DeliveryChoice::Markdown),
        );

        let err = delivery.run(REPORT).await.unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Clipboard(ClipboardError::UnsupportedPlatform)
        ));
    }

    #[tokio::test]
    async fn test_prompt_failure_propagates() {
        let delivery = DeliveryPrompt::new(RecordingClipboard::default(), BrokenPrompt);

        let err = delivery.run(REPORT).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Prompt(_)));
        assert!(delivery.clipboard().copies().is_empty());
    }
}
