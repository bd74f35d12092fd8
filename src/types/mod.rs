// Public modules
pub mod chat;
pub mod completion;
pub mod model_descriptor;
pub mod turn;

// Re-exports
pub use chat::{ChatRequest, ChatResponse, ErrorDetail};
pub use completion::{CompletionChoice, CompletionMessage, CompletionRequest, CompletionResponse};
pub use model_descriptor::{DEFAULT_MODEL_ID, ModelDescriptor, ModelRegistry};
pub use turn::{Exchange, Role, Turn};
