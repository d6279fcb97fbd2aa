//! edgar-rag - Graph-grounded RAG over SEC EDGAR ownership filings
//!
//! Answers natural-language questions about institutional ownership by
//! retrieving semantically similar filing text through a vector index
//! joined against the ownership graph, then summarizing the retrieved
//! context with a hosted chat model.
//!
//! # Architecture
//!
//! - `graph` / `embeddings` / `llm`: clients for the external collaborators
//! - `rag`: context builder, prompt assembler and pipeline orchestrator
//! - `analytics`: aggregate ownership figures for the terminal

pub mod errors;
pub mod config;
pub mod telemetry;
pub mod graph;
pub mod embeddings;
pub mod llm;
pub mod rag;
pub mod analytics;
pub mod doctor;
pub mod cli;

// Re-export commonly used types
pub use errors::{RagError, Result};
pub use rag::{AnswerResult, RagPipeline};
