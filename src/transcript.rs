//! Append-only conversation history for one session.
//!
//! The store keeps exchanges (a user turn and its reply) rather than a flat list of
//! turns, and records next to each exchange the model that produced the reply.

use crate::error::Result;
use crate::types::{Exchange, ModelDescriptor, Turn};

/// Ordered, append-only sequence of exchanges.
#[derive(Debug, Clone, Default)]
pub struct TranscriptStore {
    exchanges: Vec<Exchange>,
    models: Vec<ModelDescriptor>,
}

impl TranscriptStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an exchange and records the model that answered it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTurn` if either turn is blank or the roles are out of order.  The
    /// store is unchanged on error.
    pub fn append(&mut self, exchange: Exchange, model: ModelDescriptor) -> Result<()> {
        exchange.validate()?;
        self.exchanges.push(exchange);
        self.models.push(model);
        Ok(())
    }

    /// Read-only view of every exchange, oldest first.
    pub fn all(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// The exchange at `index`.
    pub fn get(&self, index: usize) -> Option<&Exchange> {
        self.exchanges.get(index)
    }

    /// The conversation flattened into alternating user and assistant turns.
    pub fn turns(&self) -> Vec<Turn> {
        self.exchanges
            .iter()
            .flat_map(|exchange| [exchange.user().clone(), exchange.assistant().clone()])
            .collect()
    }

    /// The model that produced the reply in exchange `index`.
    pub fn last_assistant_model(&self, index: usize) -> Option<&ModelDescriptor> {
        self.models.get(index)
    }

    /// Number of exchanges.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// True when no exchange has been appended.
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModelRegistry;

    fn llama() -> ModelDescriptor {
        ModelRegistry::new().models()[0].clone()
    }

    fn r1() -> ModelDescriptor {
        ModelRegistry::new()
            .lookup("deepseek-r1-distill-llama-70b")
            .unwrap()
            .clone()
    }

    #[test]
    fn new_store_is_empty() {
        let store = TranscriptStore::new();
        assert!(store.is_empty());
        assert!(store.all().is_empty());
        assert!(store.turns().is_empty());
        assert!(store.last_assistant_model(0).is_none());
    }

    #[test]
    fn append_records_model_per_exchange() {
        let mut store = TranscriptStore::new();
        store
            .append(Exchange::new(Turn::user("hi"), Turn::assistant("hello")), llama())
            .unwrap();
        store
            .append(
                Exchange::new(Turn::user("why?"), Turn::assistant("<think>hm</think>because")),
                r1(),
            )
            .unwrap();

        assert_eq!(store.len(), 2);
        assert!(!store.last_assistant_model(0).unwrap().is_reasoning);
        assert!(store.last_assistant_model(1).unwrap().is_reasoning);
        assert_eq!(store.get(1).unwrap().user().content(), "why?");
    }

    #[test]
    fn blank_turn_is_rejected_and_store_unchanged() {
        let mut store = TranscriptStore::new();
        store
            .append(Exchange::new(Turn::user("hi"), Turn::assistant("hello")), llama())
            .unwrap();

        let err = store
            .append(Exchange::new(Turn::user("   "), Turn::assistant("x")), llama())
            .unwrap_err();
        assert!(err.is_invalid_turn());
        assert_eq!(store.len(), 1);
        assert!(store.last_assistant_model(1).is_none());

        let err = store
            .append(Exchange::new(Turn::user("x"), Turn::assistant("\n")), llama())
            .unwrap_err();
        assert!(err.is_invalid_turn());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn turns_alternate_in_conversation_order() {
        let mut store = TranscriptStore::new();
        store
            .append(Exchange::new(Turn::user("a"), Turn::assistant("b")), llama())
            .unwrap();
        store
            .append(Exchange::new(Turn::user("c"), Turn::assistant("d")), llama())
            .unwrap();
        assert_eq!(
            store.turns(),
            vec![
                Turn::user("a"),
                Turn::assistant("b"),
                Turn::user("c"),
                Turn::assistant("d"),
            ]
        );
    }
}
