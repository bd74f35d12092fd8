//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

/// Command-line arguments for the thinkrelay-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Relay to send messages through.
    #[arrrg(optional, "Relay URL; call the provider directly when absent", "URL")]
    pub relay: Option<String>,

    /// Path to the config file.
    #[arrrg(optional, "Config file (default: config.json)", "PATH")]
    pub config: Option<String>,

    /// Model to start with.
    #[arrrg(optional, "Model to use (default: llama-3.1-8b-instant)", "MODEL")]
    pub model: Option<String>,

    /// Expand thinking blocks by default.
    #[arrrg(flag, "Show thinking blocks by default")]
    pub show_thinking: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Directory for session logs.
    #[arrrg(optional, "Directory for session logs (default: logs)", "DIR")]
    pub log_dir: Option<String>,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Model name to start with; the config file's default or the built-in default when unset.
    pub model: Option<String>,

    /// Relay base URL.  When unset the session calls the provider directly.
    pub relay_url: Option<String>,

    /// Config file to read; `config.json` is tried when unset.
    pub config_path: Option<PathBuf>,

    /// Whether new exchanges start with their thinking expanded.
    pub show_thinking: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Directory for session logs.
    pub log_dir: Option<PathBuf>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Direct provider calls (no relay)
    /// - Thinking: collapsed
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: None,
            relay_url: None,
            config_path: None,
            show_thinking: false,
            use_color: true,
            log_dir: None,
        }
    }

    /// Sets the model to start with.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Routes messages through the relay at `url`.
    pub fn with_relay(mut self, url: impl Into<String>) -> Self {
        self.relay_url = Some(url.into());
        self
    }

    /// Expands thinking blocks by default.
    pub fn with_thinking_shown(mut self, show: bool) -> Self {
        self.show_thinking = show;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            model: args.model,
            relay_url: args.relay,
            config_path: args.config.map(PathBuf::from),
            show_thinking: args.show_thinking,
            use_color: !args.no_color,
            log_dir: args.log_dir.map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.model.is_none());
        assert!(config.relay_url.is_none());
        assert!(config.config_path.is_none());
        assert!(!config.show_thinking);
        assert!(config.use_color);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            relay: Some("http://127.0.0.1:8000".to_string()),
            config: Some("chat.yaml".to_string()),
            model: Some("qwen-qwq-32b".to_string()),
            show_thinking: true,
            no_color: true,
            log_dir: Some("/tmp/logs".to_string()),
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.relay_url.as_deref(), Some("http://127.0.0.1:8000"));
        assert_eq!(config.config_path, Some(PathBuf::from("chat.yaml")));
        assert_eq!(config.model.as_deref(), Some("qwen-qwq-32b"));
        assert!(config.show_thinking);
        assert!(!config.use_color);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model("deepseek-r1-distill-llama-70b")
            .with_relay("http://relay.internal:8000")
            .with_thinking_shown(true)
            .without_color();
        assert_eq!(config.model.as_deref(), Some("deepseek-r1-distill-llama-70b"));
        assert_eq!(config.relay_url.as_deref(), Some("http://relay.internal:8000"));
        assert!(config.show_thinking);
        assert!(!config.use_color);
    }
}
