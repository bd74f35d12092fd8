// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod relay;
pub mod render;
pub mod server;
pub mod thinking;
pub mod transcript;
pub mod types;

mod observability;

// Re-exports
pub use client::{CompletionProvider, ProviderClient};
pub use client_logger::{ClientLogger, TracingClientLogger};
pub use error::{Error, Result};
pub use gateway::{CompletionGateway, Gateway};
pub use observability::register_biometrics;
pub use relay::RelayClient;
pub use thinking::{ExtractionResult, extract};
pub use transcript::TranscriptStore;
pub use types::*;
