//! Chat application module for interactive conversations through a gateway.
//!
//! This module provides the REPL side of thinkrelay.  It supports:
//!
//! - Switching models between exchanges
//! - Per-exchange expansion of reasoning-model thinking
//! - Slash commands for session control
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and gateway interaction
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer, render_exchange};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, ExchangeView, SessionStats};
