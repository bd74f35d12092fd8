//! HTTP relay between chat clients and an OpenAI-compatible provider.
//!
//! # Usage
//!
//! ```bash
//! # Listen on 127.0.0.1:8000, reading config.json when present
//! THINKRELAY_API_KEY=gsk-... thinkrelay-server
//!
//! # Choose the address, default model, and config file
//! thinkrelay-server --bind 0.0.0.0:9000 --model qwen-qwq-32b --config relay.yaml
//! ```

use std::sync::Arc;

use arrrg::CommandLine;
use biometrics::Collector;
use tokio::net::TcpListener;

use thinkrelay::config::{ServerArgs, ServerConfig};
use thinkrelay::logging::init_logging;
use thinkrelay::server::{RelayState, serve};
use thinkrelay::{CompletionGateway, ProviderClient, TracingClientLogger, register_biometrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = ServerArgs::from_command_line_relaxed("thinkrelay-server [OPTIONS]");
    if !free.is_empty() {
        eprintln!("unexpected arguments: {}", free.join(" "));
        std::process::exit(2);
    }

    let config = match ServerConfig::resolve(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("thinkrelay-server: {err}");
            std::process::exit(1);
        }
    };

    let (log_path, _guard) = init_logging(&config.logging)?;
    tracing::info!(log = %log_path.display(), "session log opened");

    let collector = Collector::new();
    register_biometrics(collector);

    let mut client = ProviderClient::with_options(
        Some(config.api_key.clone()),
        Some(config.provider_url.clone()),
        Some(config.timeout),
    )?;
    if config.log_payloads {
        client = client.with_logger(Arc::new(TracingClientLogger));
    }
    tracing::info!(
        provider = client.base_url(),
        default_model = %config.default_model,
        models = config.registry.models().len(),
        "relay configured"
    );

    let state = RelayState::new(
        Arc::new(CompletionGateway::new(client)),
        config.registry,
        config.default_model,
    );
    let listener = TcpListener::bind(config.bind).await?;
    serve(listener, state).await?;
    tracing::info!("relay stopped");
    Ok(())
}
