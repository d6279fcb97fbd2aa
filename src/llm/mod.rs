//! Hosted chat model access
//!
//! The summarization call goes to an Anthropic-on-Bedrock style endpoint
//! with greedy decoding parameters, wrapped in an explicit retry policy.

pub mod client;
pub mod retry;

pub use client::{BedrockChatClient, ChatMessage, ChatModel, DecodingParams, PromptPayload};
pub use retry::RetryPolicy;
