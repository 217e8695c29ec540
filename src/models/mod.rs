mod generate;
mod turn;

pub use generate::{GenerateChunk, GenerateOptions, GenerateRequest};
pub use turn::Turn;
