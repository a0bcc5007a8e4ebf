//! OpenAI chat-completions provider for presentation spell checking.

pub mod client;
pub mod config;

pub use client::OpenAiProvider;
pub use config::OpenAiConfig;
