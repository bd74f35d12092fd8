//! Core chat session management.
//!
//! A [`ChatSession`] is everything one conversation owns: the transcript, the model
//! selected for the next exchange, and whether each exchange's thinking is currently
//! expanded.  Nothing here is shared between sessions.

use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::thinking::extract;
use crate::transcript::TranscriptStore;
use crate::types::{Exchange, ModelDescriptor, ModelRegistry, Turn};

/// A chat session that manages conversation state and gateway calls.
///
/// # Example
///
/// ```
/// use thinkrelay::chat::ChatSession;
/// use thinkrelay::{Gateway, ModelDescriptor, ModelRegistry, Result, Turn};
///
/// struct Echo;
///
/// #[async_trait::async_trait]
/// impl Gateway for Echo {
///     async fn complete(&self, _: &[Turn], message: &str, _: &ModelDescriptor) -> Result<Turn> {
///         Ok(Turn::assistant(format!("you said {message}")))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let registry = ModelRegistry::new();
/// let model = registry.lookup("llama-3.1-8b-instant").unwrap().clone();
/// let mut session = ChatSession::new(Echo, registry, model);
/// let index = session.submit("hello").await.unwrap();
/// assert_eq!(session.view(index).unwrap().answer, "you said hello");
/// # });
/// ```
pub struct ChatSession<G: Gateway> {
    gateway: G,
    registry: ModelRegistry,
    model: ModelDescriptor,
    transcript: TranscriptStore,
    expanded: Vec<bool>,
    show_thinking: bool,
}

/// How one exchange should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeView<'a> {
    /// 1-based exchange number.
    pub number: usize,
    /// The user's message.
    pub user: &'a str,
    /// The reply with any reasoning removed.
    pub answer: String,
    /// Reasoning split out of the reply, only for reasoning-capable models.
    pub reasoning: Option<String>,
    /// Whether the reasoning is currently expanded.
    pub expanded: bool,
    /// The model that produced the reply.
    pub model: &'a ModelDescriptor,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The model used for the next exchange.
    pub model: ModelDescriptor,
    /// The number of exchanges in the conversation.
    pub exchange_count: usize,
    /// Exchanges answered by a reasoning-capable model.
    pub reasoning_exchanges: usize,
    /// Exchanges whose thinking is currently expanded.
    pub expanded_exchanges: usize,
    /// Whether new exchanges start expanded.
    pub show_thinking: bool,
}

impl<G: Gateway> ChatSession<G> {
    /// Creates a new, empty chat session.
    pub fn new(gateway: G, registry: ModelRegistry, model: ModelDescriptor) -> Self {
        Self {
            gateway,
            registry,
            model,
            transcript: TranscriptStore::new(),
            expanded: Vec::new(),
            show_thinking: false,
        }
    }

    /// Sets whether new exchanges start with their thinking expanded.
    pub fn with_thinking_shown(mut self, show: bool) -> Self {
        self.show_thinking = show;
        self
    }

    /// Sends a user message and records the reply.
    ///
    /// The gateway is called exactly once.  On success the user turn and the reply are
    /// appended together and the new exchange's index is returned.
    ///
    /// # Errors
    ///
    /// `InvalidTurn` if the message is blank (the gateway is not called), or the
    /// gateway's error.  The transcript is unchanged on error.
    pub async fn submit(&mut self, input: &str) -> Result<usize> {
        let user = Turn::user(input.trim());
        user.validate()?;

        let history = self.transcript.turns();
        let reply = self
            .gateway
            .complete(&history, user.content(), &self.model)
            .await?;

        self.transcript
            .append(Exchange::new(user, reply), self.model.clone())?;
        self.expanded.push(self.show_thinking);
        Ok(self.transcript.len() - 1)
    }

    /// The display view of exchange `index` (0-based).
    ///
    /// Replies from reasoning-capable models are split into reasoning and answer; other
    /// replies are shown as they are.
    pub fn view(&self, index: usize) -> Option<ExchangeView<'_>> {
        let exchange = self.transcript.get(index)?;
        let model = self.transcript.last_assistant_model(index)?;
        let raw = exchange.assistant().content();
        let (reasoning, answer) = if model.is_reasoning {
            let extracted = extract(raw);
            (extracted.reasoning, extracted.visible_answer)
        } else {
            (None, raw.to_string())
        };
        Some(ExchangeView {
            number: index + 1,
            user: exchange.user().content(),
            answer,
            reasoning,
            expanded: self.expanded.get(index).copied().unwrap_or(false),
            model,
        })
    }

    /// Views of every exchange, oldest first.
    pub fn views(&self) -> Vec<ExchangeView<'_>> {
        (0..self.transcript.len())
            .filter_map(|index| self.view(index))
            .collect()
    }

    /// Expands the thinking of exchange `index`.  Returns false if there is no such exchange.
    pub fn show_thinking(&mut self, index: usize) -> bool {
        self.set_expanded(index, |_| true)
    }

    /// Collapses the thinking of exchange `index`.  Returns false if there is no such exchange.
    pub fn hide_thinking(&mut self, index: usize) -> bool {
        self.set_expanded(index, |_| false)
    }

    /// Flips the thinking of exchange `index`.  Returns false if there is no such exchange.
    pub fn toggle_thinking(&mut self, index: usize) -> bool {
        self.set_expanded(index, |expanded| !expanded)
    }

    fn set_expanded(&mut self, index: usize, update: impl FnOnce(bool) -> bool) -> bool {
        match self.expanded.get_mut(index) {
            Some(expanded) => {
                *expanded = update(*expanded);
                true
            }
            None => false,
        }
    }

    /// Expands or collapses every exchange, and makes that the default for new ones.
    pub fn set_all_thinking(&mut self, show: bool) {
        self.show_thinking = show;
        self.expanded.iter_mut().for_each(|expanded| *expanded = show);
    }

    /// Changes the model used for the next exchanges.
    ///
    /// # Errors
    ///
    /// `BadRequest` if the registry has no such model.
    pub fn set_model(&mut self, name: &str) -> Result<&ModelDescriptor> {
        let model = self.registry.lookup(name).cloned().ok_or_else(|| {
            Error::bad_request(format!("Unknown model: {name}"), Some("model".to_string()))
        })?;
        self.model = model;
        Ok(&self.model)
    }

    /// Returns the model used for the next exchange.
    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    /// Returns the models that can be selected.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Returns the conversation so far.
    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    /// Returns the number of exchanges in the conversation.
    pub fn exchange_count(&self) -> usize {
        self.transcript.len()
    }

    /// Discards the conversation and its display state.  The model selection is kept.
    pub fn reset(&mut self) {
        self.transcript = TranscriptStore::new();
        self.expanded.clear();
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        let reasoning_exchanges = (0..self.transcript.len())
            .filter_map(|index| self.transcript.last_assistant_model(index))
            .filter(|model| model.is_reasoning)
            .count();
        SessionStats {
            model: self.model.clone(),
            exchange_count: self.transcript.len(),
            reasoning_exchanges,
            expanded_exchanges: self.expanded.iter().filter(|expanded| **expanded).count(),
            show_thinking: self.show_thinking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_MODEL_ID, Role};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedGateway {
        replies: Mutex<VecDeque<Result<Turn>>>,
        calls: Mutex<Vec<(usize, String, String)>>,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<Result<Turn>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl Gateway for ScriptedGateway {
        async fn complete(
            &self,
            transcript: &[Turn],
            user_message: &str,
            model: &ModelDescriptor,
        ) -> Result<Turn> {
            self.calls.lock().unwrap().push((
                transcript.len(),
                user_message.to_string(),
                model.provider_id.clone(),
            ));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Turn::assistant("default reply")))
        }
    }

    fn session(replies: Vec<Result<Turn>>) -> ChatSession<ScriptedGateway> {
        let registry = ModelRegistry::new();
        let model = registry.lookup(DEFAULT_MODEL_ID).unwrap().clone();
        ChatSession::new(ScriptedGateway::new(replies), registry, model)
    }

    #[tokio::test]
    async fn hello_produces_user_then_assistant() {
        let mut session = session(vec![Ok(Turn::assistant("Hi! How can I help?"))]);
        let index = session.submit("Hello").await.unwrap();
        assert_eq!(index, 0);

        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role(), Role::User);
        assert_eq!(turns[0].content(), "Hello");
        assert_eq!(turns[1].role(), Role::Assistant);
        assert_eq!(turns[1].content(), "Hi! How can I help?");
    }

    #[tokio::test]
    async fn blank_input_never_reaches_gateway() {
        let mut session = session(Vec::new());
        let err = session.submit("   ").await.unwrap_err();
        assert!(err.is_invalid_turn());
        assert_eq!(session.gateway.call_count(), 0);
        assert_eq!(session.exchange_count(), 0);
    }

    #[tokio::test]
    async fn gateway_failure_leaves_transcript_unchanged() {
        let mut session = session(vec![
            Ok(Turn::assistant("first")),
            Err(Error::gateway_unavailable("down", Some(500), None)),
        ]);
        session.submit("one").await.unwrap();
        let err = session.submit("two").await.unwrap_err();
        assert!(err.is_gateway_unavailable());
        assert_eq!(session.exchange_count(), 1);
        assert_eq!(session.stats().exchange_count, 1);
        assert!(session.view(1).is_none());
    }

    #[tokio::test]
    async fn history_grows_with_each_call() {
        let mut session = session(Vec::new());
        session.submit("one").await.unwrap();
        session.submit("two").await.unwrap();
        let calls = session.gateway.calls.lock().unwrap().clone();
        assert_eq!(calls[0].0, 0);
        assert_eq!(calls[1].0, 2);
        assert_eq!(calls[1].1, "two");
    }

    #[tokio::test]
    async fn extraction_follows_the_model_that_answered() {
        let reply = "<think>greet back</think>Hello!";
        let mut session = session(vec![
            Ok(Turn::assistant(reply)),
            Ok(Turn::assistant(reply)),
        ]);

        session.submit("hi").await.unwrap();
        session.set_model("deepseek-r1-distill-llama-70b").unwrap();
        session.submit("hi again").await.unwrap();
        session.set_model(DEFAULT_MODEL_ID).unwrap();

        let plain = session.view(0).unwrap();
        assert_eq!(plain.answer, reply);
        assert_eq!(plain.reasoning, None);

        let reasoned = session.view(1).unwrap();
        assert_eq!(reasoned.number, 2);
        assert_eq!(reasoned.answer, "Hello!");
        assert_eq!(reasoned.reasoning.as_deref(), Some("greet back"));
        assert!(reasoned.model.is_reasoning);

        assert_eq!(
            session.transcript().get(1).unwrap().assistant().content(),
            reply
        );
        assert_eq!(session.stats().reasoning_exchanges, 1);
    }

    #[tokio::test]
    async fn expansion_state_is_per_exchange() {
        let mut session = session(Vec::new());
        session.submit("one").await.unwrap();
        session.submit("two").await.unwrap();

        assert!(session.show_thinking(1));
        assert!(!session.view(0).unwrap().expanded);
        assert!(session.view(1).unwrap().expanded);

        assert!(session.toggle_thinking(0));
        assert!(session.hide_thinking(1));
        assert!(session.view(0).unwrap().expanded);
        assert!(!session.view(1).unwrap().expanded);

        assert!(!session.toggle_thinking(2));
    }

    #[tokio::test]
    async fn set_all_thinking_changes_default_for_new_exchanges() {
        let mut session = session(Vec::new());
        session.submit("one").await.unwrap();
        session.set_all_thinking(true);
        session.submit("two").await.unwrap();
        assert!(session.views().iter().all(|view| view.expanded));
        assert_eq!(session.stats().expanded_exchanges, 2);
    }

    #[test]
    fn unknown_model_is_rejected() {
        let mut session = session(Vec::new());
        let err = session.set_model("gpt-imaginary").unwrap_err();
        assert!(err.is_bad_request());
        assert_eq!(session.model().provider_id, DEFAULT_MODEL_ID);
    }

    #[tokio::test]
    async fn reset_discards_conversation_but_keeps_model() {
        let mut session = session(Vec::new());
        session.set_model("qwen-qwq-32b").unwrap();
        session.submit("one").await.unwrap();
        session.reset();
        assert_eq!(session.exchange_count(), 0);
        assert!(session.views().is_empty());
        assert_eq!(session.model().provider_id, "qwen-qwq-32b");
    }
}
