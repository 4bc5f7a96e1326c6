//! Context module - Conversation topic memory

mod tag;

pub use tag::{ContextTag, UnknownContextTag};
