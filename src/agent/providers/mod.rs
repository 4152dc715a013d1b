//! Concrete reasoning-engine providers.

pub mod openai;

pub use openai::OpenAiProvider;
