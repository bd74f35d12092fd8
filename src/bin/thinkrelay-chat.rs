//! Interactive chat with optional reasoning-model thinking display.
//!
//! # Usage
//!
//! ```bash
//! # Call the provider directly (needs THINKRELAY_API_KEY or GROQ_API_KEY in config.json)
//! thinkrelay-chat
//!
//! # Go through a running relay instead
//! thinkrelay-chat --relay http://127.0.0.1:8000
//!
//! # Start on a reasoning model with thinking expanded
//! thinkrelay-chat --model qwen-qwq-32b --show-thinking
//! ```
//!
//! # Commands
//!
//! - `/model <name>` - Change the model for the next exchanges
//! - `/show <n>`, `/hide <n>`, `/toggle <n>` - Thinking for exchange n
//! - `/thinking on|off` - Thinking for every exchange
//! - `/history` - Redraw the conversation
//! - `/new` - Start over
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use thinkrelay::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command, render_exchange,
};
use thinkrelay::config::{ConfigFile, resolve_model};
use thinkrelay::logging::{LoggingConfig, init_logging};
use thinkrelay::{CompletionGateway, Gateway, ProviderClient, RelayClient};

type Session = ChatSession<Box<dyn Gateway>>;

/// Main entry point for the thinkrelay-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("thinkrelay-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let file = ConfigFile::discover(config.config_path.as_deref())?;

    let logging = LoggingConfig::new()
        .with_dir(config.log_dir.clone().or(file.log_dir.clone()))
        .with_level(file.log_level.clone())
        .with_stderr(false);
    let (log_path, _guard) = init_logging(&logging)?;

    let registry = file.registry();
    let model = resolve_model(
        &registry,
        config.model.as_deref().or(file.default_model.as_deref()),
    )?;

    let gateway: Box<dyn Gateway> = match &config.relay_url {
        Some(url) => Box::new(RelayClient::new(url, Some(file.timeout()))?),
        None => Box::new(CompletionGateway::new(ProviderClient::with_options(
            Some(file.api_key()?),
            file.provider_url.clone(),
            Some(file.timeout()),
        )?)),
    };
    tracing::info!(
        model = %model,
        relay = config.relay_url.as_deref().unwrap_or("direct"),
        "chat session started"
    );

    let mut session: Session =
        ChatSession::new(gateway, registry, model).with_thinking_shown(config.show_thinking);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!("thinkrelay chat (model: {})", session.model());
    println!("Session log: {}", log_path.display());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    if !handle_command(cmd, &mut session, &mut renderer) {
                        println!("Goodbye!");
                        break;
                    }
                    continue;
                }

                match session.submit(line).await {
                    Ok(index) => {
                        if let Some(view) = session.view(index) {
                            render_exchange(&view, &mut renderer);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "exchange failed");
                        renderer.print_error(&err.to_string());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    tracing::info!(exchanges = session.exchange_count(), "chat session ended");
    Ok(())
}

/// Applies one slash command.  Returns false when the user asked to quit.
fn handle_command(cmd: ChatCommand, session: &mut Session, renderer: &mut dyn Renderer) -> bool {
    match cmd {
        ChatCommand::Quit => return false,
        ChatCommand::Help => {
            for line in help_text().lines() {
                renderer.print_info(&format!("    {line}"));
            }
        }
        ChatCommand::Model(name) => match session.set_model(&name) {
            Ok(model) => renderer.print_info(&format!("Model changed to: {model}")),
            Err(err) => renderer.print_error(&err.to_string()),
        },
        ChatCommand::Models => {
            let current = session.model().provider_id.clone();
            for model in session.registry().models() {
                let marker = if model.provider_id == current { "*" } else { " " };
                let kind = if model.is_reasoning { " [reasoning]" } else { "" };
                renderer.print_info(&format!("  {marker} {model}{kind}"));
            }
        }
        ChatCommand::Show(number) => redraw_one(session, renderer, number, |s, i| {
            s.show_thinking(i)
        }),
        ChatCommand::Hide(number) => redraw_one(session, renderer, number, |s, i| {
            s.hide_thinking(i)
        }),
        ChatCommand::Toggle(number) => redraw_one(session, renderer, number, |s, i| {
            s.toggle_thinking(i)
        }),
        ChatCommand::Thinking(show) => {
            session.set_all_thinking(show);
            renderer.print_info(if show {
                "Thinking expanded."
            } else {
                "Thinking collapsed."
            });
        }
        ChatCommand::History => {
            if session.exchange_count() == 0 {
                renderer.print_info("No exchanges yet.");
            }
            for view in session.views() {
                render_exchange(&view, renderer);
            }
        }
        ChatCommand::New => {
            session.reset();
            renderer.print_info("Started a new conversation.");
        }
        ChatCommand::Stats => {
            let stats = session.stats();
            renderer.print_info("    Session Statistics:");
            renderer.print_info(&format!("      Model: {}", stats.model));
            renderer.print_info(&format!("      Exchanges: {}", stats.exchange_count));
            renderer.print_info(&format!(
                "      Reasoning exchanges: {}",
                stats.reasoning_exchanges
            ));
            renderer.print_info(&format!(
                "      Expanded: {}",
                stats.expanded_exchanges
            ));
            renderer.print_info(&format!(
                "      New exchanges start: {}",
                if stats.show_thinking {
                    "expanded"
                } else {
                    "collapsed"
                }
            ));
        }
        ChatCommand::Invalid(message) => renderer.print_error(&message),
    }
    true
}

fn redraw_one(
    session: &mut Session,
    renderer: &mut dyn Renderer,
    number: usize,
    update: impl FnOnce(&mut Session, usize) -> bool,
) {
    let index = number - 1;
    if !update(session, index) {
        renderer.print_error(&format!("No exchange {number}"));
        return;
    }
    if let Some(view) = session.view(index) {
        if view.reasoning.is_none() {
            renderer.print_info(&format!("Exchange {number} has no thinking."));
        }
        render_exchange(&view, renderer);
    }
}
