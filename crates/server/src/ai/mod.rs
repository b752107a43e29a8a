//! AI card extraction powered by Claude API

pub mod card_extract;
pub mod client;

pub use card_extract::CardExtractor;
pub use client::ClaudeClient;
