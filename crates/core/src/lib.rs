//! # Loresmith Core
//!
//! Domain types, traits, and error definitions for the Loresmith
//! reasoning engine. This crate has **zero framework dependencies** -
//! it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here:
//! the LLM backend ([`backend::LlmBackend`]) and the agent's
//! capabilities ([`tool::Tool`]). Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted mock implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod error;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use backend::{Completion, LlmBackend};
pub use error::{BackendError, ConversationError, Error, Result, ToolError};
pub use message::{ConversationId, ConversationMessage, Role};
pub use tool::{DispatchOutcome, ParamSpec, Tool, ToolDescriptor, ToolRegistry, ToolResult};
