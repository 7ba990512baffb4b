//! Core types: protocol envelopes, error model, tool metadata and results.

pub mod content;
pub mod error;
pub mod mcp;
pub mod tool;
