//! Threadbot: a Discord bot that holds threaded conversations backed by
//! Gemini, with per-thread history persisted in MySQL.

pub mod config;
pub mod conversation;
pub mod db;
pub mod error;
pub mod llm;
pub mod messaging;

pub use error::{Error, Result};

use serde::{Deserialize, Serialize};

/// Who authored a conversation turn.
///
/// The two variants follow the Gemini role vocabulary so stored rows can be
/// replayed to the API verbatim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "model" => Some(Role::Model),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One role-tagged utterance in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_round_trip() {
        for role in [Role::User, Role::Model] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("assistant"), None);
        assert_eq!(Role::parse(""), None);
    }
}
