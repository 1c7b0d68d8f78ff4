//! Markdown Rendering
//!
//! Converts the report markdown to HTML for rich-text delivery. GitHub style
//! extensions are on and single newlines become `<br />`, so line-oriented
//! reports keep their shape when pasted.

use pulldown_cmark::{html, Event, Options, Parser};

/// Extensions enabled for report rendering.
pub fn render_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// Renders `markdown` to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, render_options()).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
