//! Conversation lifecycle: persistence and the per-turn pipeline.

pub mod engine;
pub mod store;

pub use engine::ChatEngine;
pub use store::{ConversationStore, HistoryStore, ThreadRecordId};
