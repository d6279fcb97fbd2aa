//! Retrieval-augmented answering over the ownership graph
//!
//! The core flow: embed the question, run the hybrid vector+graph query,
//! serialize the rows into a context document, assemble the prompt, and
//! send it to the summary model with bounded retry.

pub mod pipeline;
pub mod prompt;
pub mod retrieval;

pub use pipeline::{AnswerResult, RagPipeline};
pub use retrieval::{ContextBuilder, ContextDocument, RetrievalConfig, RetrievalRow, ScoreAggregation};
