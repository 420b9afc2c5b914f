//! Agent runtime for the car-service booking assistant.
//!
//! This crate wires a completion capability (an external LLM consumed over an
//! OpenAI-compatible API) to the booking backend:
//!
//! 1. **Conversation context** (`conversation`) - append-only turn log with a
//!    bounded render window for the stateless completion call
//! 2. **Tool bridge** (`tools`) - declares the callable backend operations
//!    and dispatches tool invocations over the REST API
//! 3. **Orchestration** (`runtime`) - the bounded chat loop: prompt in,
//!    tool-call round trips, final reply out
//!
//! # Key Types
//!
//! - `ChatSession` - per-conversation orchestrator (see `runtime`)
//! - `CompletionClient` - pluggable trait over the completion capability
//! - `ToolDispatcher` - seam between the chat loop and the backend bridge
//!
//! # Error Principle
//!
//! A malformed or unknown tool invocation is a protocol error and fails the
//! dispatch loudly. A well-formed invocation that fails for a domain or
//! transport reason is handed back to the model as a structured
//! `success: false` payload it can phrase for the user.

pub mod conversation;
pub mod llm;
pub mod runtime;
pub mod tools;

pub use conversation::{ConversationLog, Role, Turn};
pub use llm::{
    ChatMessage, CompletionClient, CompletionOutcome, LlmError, OpenAiCompatClient,
    ToolCallRequest,
};
pub use runtime::{AgentError, ChatSession, GENERIC_APOLOGY};
pub use tools::{BridgeError, HttpToolBridge, ToolDeclaration, ToolDispatcher};
