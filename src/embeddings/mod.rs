//! Question embedding via a hosted embedding model

pub mod client;

pub use client::{Embedder, TitanEmbeddingClient};
