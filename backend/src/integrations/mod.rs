//! Clients for external services the domain depends on through traits.

pub mod openai;

pub use openai::OpenAiProvider;
