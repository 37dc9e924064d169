pub mod chunk;
pub mod client;
pub mod config;
pub mod error;
pub mod keys;
pub mod llm;
pub mod prompts;
pub mod schemas;
pub mod setup;
pub mod types;
pub mod voices;
pub mod workflow;

pub use client::GenerationClient;
pub use error::GenerationError;
pub use keys::KeyPool;
pub use llm::{GeminiBackend, ModelBackend};
pub use types::{CharacterProfile, StoryboardData, UserInput};
pub use workflow::StoryboardPipeline;
