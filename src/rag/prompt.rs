//! Prompt assembly
//!
//! Pure functions merging the fixed system instruction, the user question
//! and the serialized context into the two-message payload sent to the
//! summary model. No side effects; identical inputs yield byte-identical
//! output.

use crate::llm::{ChatMessage, PromptPayload};

/// Fixed system instruction for the summary model
pub const SYSTEM_PROMPT: &str = "\
You are a Financial expert with SEC filings who can answer questions only based on the context below.
* Think step by step before answering.
* Do not return helpful or extra text or apologies
* Just return summary to the user. DO NOT start with Here is a summary
* List the results in rich text format (no HTML) if there are more than one results
* Summarise the results from the context in accordance to what the user asks and quote available references
";

/// Render the user message body: question and context substituted
/// verbatim into the two-field template
pub fn render_user_prompt(question: &str, context: &str) -> String {
    format!(
        "\n<question>\n{}\n</question>\n\nHere is the context:\n<context>\n{}\n</context>\n",
        question, context
    )
}

/// Assemble the full payload: system instruction plus one combined user
/// message
pub fn assemble(question: &str, context: &str) -> PromptPayload {
    PromptPayload {
        system: SYSTEM_PROMPT.to_string(),
        messages: vec![ChatMessage::user(render_user_prompt(question, context))],
    }
}
