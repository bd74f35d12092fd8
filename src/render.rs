//! Output rendering for the chat application.
//!
//! This module provides a renderer trait and a plain-text implementation.  Thinking is
//! drawn dim and italic when color is enabled so it reads apart from the answer.

use std::io::{self, Stdout, Write};

use crate::chat::ExchangeView;

/// ANSI escape code for dim text (used for thinking blocks).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for thinking blocks).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for cyan text (used for the model name).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
pub trait Renderer: Send {
    /// Print the user's message.
    fn print_user(&mut self, number: usize, text: &str);

    /// Print the visible answer, labelled with the model that produced it.
    fn print_answer(&mut self, model: &str, text: &str);

    /// Print expanded thinking.
    fn print_thinking(&mut self, text: &str);

    /// Print the one-line hint shown in place of collapsed thinking.
    fn print_thinking_hidden(&mut self, number: usize);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write = Stdout> {
    out: W,
    use_color: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer on stdout with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    // Terminal write failures are not actionable mid-conversation.
    fn emit(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_user(&mut self, number: usize, text: &str) {
        let label = self.styled(ANSI_BOLD, &format!("[{number}] You:"));
        self.emit(&format!("{label} {text}"));
    }

    fn print_answer(&mut self, model: &str, text: &str) {
        let label = self.styled(ANSI_BOLD, "Bot");
        let model = self.styled(ANSI_CYAN, &format!("({model})"));
        self.emit(&format!("{label} {model}: {text}"));
    }

    fn print_thinking(&mut self, text: &str) {
        if self.use_color {
            let block = format!("{ANSI_DIM}{ANSI_ITALIC}{text}{ANSI_RESET}");
            self.emit(&block);
        } else {
            for line in text.lines() {
                self.emit(&format!("[thinking] {line}"));
            }
        }
    }

    fn print_thinking_hidden(&mut self, number: usize) {
        let hint = format!("[thinking hidden, /show {number} to expand]");
        let hint = self.styled(ANSI_DIM, &hint);
        self.emit(&hint);
    }

    fn print_error(&mut self, error: &str) {
        let line = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.emit(&line);
    }

    fn print_info(&mut self, info: &str) {
        self.emit(info);
    }
}

/// Draws one exchange: the user's message, then the thinking (expanded or as a hint)
/// when there is any, then the answer.
pub fn render_exchange(view: &ExchangeView<'_>, renderer: &mut dyn Renderer) {
    renderer.print_user(view.number, view.user);
    if let Some(reasoning) = &view.reasoning {
        if view.expanded {
            renderer.print_thinking(reasoning);
        } else {
            renderer.print_thinking_hidden(view.number);
        }
    }
    renderer.print_answer(&view.model.display_name, &view.answer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModelDescriptor;

    fn render(view: &ExchangeView<'_>, use_color: bool) -> String {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), use_color);
        render_exchange(view, &mut renderer);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn reasoning_model() -> ModelDescriptor {
        ModelDescriptor::new("Qwen QwQ 32B", "qwen-qwq-32b", true)
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn collapsed_thinking_shows_hint() {
        let model = reasoning_model();
        let view = ExchangeView {
            number: 3,
            user: "why?",
            answer: "because".to_string(),
            reasoning: Some("secret steps".to_string()),
            expanded: false,
            model: &model,
        };
        let out = render(&view, false);
        assert_eq!(
            out,
            "[3] You: why?\n[thinking hidden, /show 3 to expand]\nBot (Qwen QwQ 32B): because\n"
        );
        assert!(!out.contains("secret steps"));
    }

    #[test]
    fn expanded_thinking_is_prefixed_without_color() {
        let model = reasoning_model();
        let view = ExchangeView {
            number: 1,
            user: "q",
            answer: "a".to_string(),
            reasoning: Some("step one\nstep two".to_string()),
            expanded: true,
            model: &model,
        };
        let out = render(&view, false);
        assert!(out.contains("[thinking] step one\n[thinking] step two\n"));
    }

    #[test]
    fn expanded_thinking_is_dim_italic_with_color() {
        let model = reasoning_model();
        let view = ExchangeView {
            number: 1,
            user: "q",
            answer: "a".to_string(),
            reasoning: Some("hmm".to_string()),
            expanded: true,
            model: &model,
        };
        let out = render(&view, true);
        assert!(out.contains(&format!("{ANSI_DIM}{ANSI_ITALIC}hmm{ANSI_RESET}")));
    }

    #[test]
    fn no_reasoning_means_no_thinking_line() {
        let model = ModelDescriptor::new("Llama 3.1 8B Instant", "llama-3.1-8b-instant", false);
        let view = ExchangeView {
            number: 1,
            user: "Hello",
            answer: "Hi".to_string(),
            reasoning: None,
            expanded: true,
            model: &model,
        };
        let out = render(&view, false);
        assert_eq!(out, "[1] You: Hello\nBot (Llama 3.1 8B Instant): Hi\n");
    }

    #[test]
    fn errors_are_labelled() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        renderer.print_error("boom");
        assert_eq!(String::from_utf8(renderer.into_inner()).unwrap(), "Error: boom\n");
    }
}
