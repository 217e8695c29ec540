pub mod client;
pub mod error;
pub mod prompt;
pub mod streaming;

pub use client::{ClientSettings, OllamaClient};
pub use error::InferenceError;
pub use prompt::{build_prompt, context_window, PromptSettings};
pub use streaming::{read_generate_stream, Completion, NdjsonDecoder};
