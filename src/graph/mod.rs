//! Graph store access
//!
//! The ownership graph (Manager/Company/filing-document nodes) lives in an
//! external Neo4j instance. This module wraps its HTTP transactional API
//! behind a `QueryExecutor` trait so the pipeline can be exercised without
//! a live server.

pub mod client;
pub mod queries;

pub use client::{GraphClient, QueryExecutor, QueryTable};
