// Roast generation: a pluggable LLM backend plus a canned fallback, so
// generation always yields markdown.

pub mod generator;
pub mod prompts;

pub use generator::{ChatCompletionBackend, GeneratedRoast, GenerationError, RoastBackend, RoastGenerator};
