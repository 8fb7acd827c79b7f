//! Tutoring Tasks
//!
//! The menu of tasks, the instruction template behind each one and the
//! splitter that cuts model answers down to message size. Everything here is
//! pure; state and I/O live in `conversation` and `telegram`.

mod chunk;
mod prompt;
mod task;

pub use chunk::{chunks, Chunks, DEFAULT_CHUNK_LIMIT};
pub use prompt::{build_prompt, PromptError};
pub use task::TaskChoice;
