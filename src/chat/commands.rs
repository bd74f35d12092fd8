//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the model.

/// A parsed chat command.
///
/// Exchange numbers are 1-based, as displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Change the model used for the next exchanges.
    Model(String),

    /// List the available models.
    Models,

    /// Expand the thinking of one exchange.
    Show(usize),

    /// Collapse the thinking of one exchange.
    Hide(usize),

    /// Flip the thinking visibility of one exchange.
    Toggle(usize),

    /// Expand or collapse the thinking of every exchange.
    Thinking(bool),

    /// Redraw the whole conversation.
    History,

    /// Discard this session and start a new one.
    New,

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use thinkrelay::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/show 2"), Some(ChatCommand::Show(2)));
/// assert!(parse_command("Hello!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "models" => ChatCommand::Models,
        "show" => parse_exchange_command(argument, ChatCommand::Show, "/show"),
        "hide" => parse_exchange_command(argument, ChatCommand::Hide, "/hide"),
        "toggle" => parse_exchange_command(argument, ChatCommand::Toggle, "/toggle"),
        "thinking" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Thinking(value),
            None => ChatCommand::Invalid("/thinking expects 'on' or 'off'".to_string()),
        },
        "history" => ChatCommand::History,
        "new" => ChatCommand::New,
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_exchange_command<F>(argument: Option<&str>, constructor: F, name: &str) -> ChatCommand
where
    F: Fn(usize) -> ChatCommand,
{
    match argument {
        Some(arg) => match arg.parse::<usize>() {
            Ok(value) if value > 0 => constructor(value),
            _ => ChatCommand::Invalid(format!("{} expects an exchange number", name)),
        },
        None => ChatCommand::Invalid(format!("{} requires an exchange number", name)),
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /model <name>          Change the model (e.g., /model qwen-qwq-32b)
  /models                List available models
  /show <n>              Expand the thinking of exchange n
  /hide <n>              Collapse the thinking of exchange n
  /toggle <n>            Flip the thinking of exchange n
  /thinking on|off       Expand or collapse all thinking
  /history               Redraw the conversation
  /new                   Start a new conversation
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
