use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Who authored a turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl Role {
    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation.
///
/// Turns are immutable once created.  The same `{"role", "content"}` shape is used on
/// the relay's `/chat` endpoint and in the provider's `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    /// Create a new turn with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// The author of this turn.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The raw content of this turn.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Rejects turns whose content is empty after trimming whitespace.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            Err(Error::invalid_turn(format!(
                "{} turn has empty content",
                self.role
            )))
        } else {
            Ok(())
        }
    }
}

/// A user turn paired with the assistant turn that answered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    user: Turn,
    assistant: Turn,
}

impl Exchange {
    /// Pair a user turn with its reply.
    pub fn new(user: Turn, assistant: Turn) -> Self {
        Self { user, assistant }
    }

    /// The user half of the exchange.
    pub fn user(&self) -> &Turn {
        &self.user
    }

    /// The assistant half of the exchange.
    pub fn assistant(&self) -> &Turn {
        &self.assistant
    }

    /// Validates both turns and checks that they are user then assistant.
    pub fn validate(&self) -> Result<()> {
        if self.user.role != Role::User {
            return Err(Error::invalid_turn("exchange must open with a user turn"));
        }
        if self.assistant.role != Role::Assistant {
            return Err(Error::invalid_turn(
                "exchange must close with an assistant turn",
            ));
        }
        self.user.validate()?;
        self.assistant.validate()
    }
}
