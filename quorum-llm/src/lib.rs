//! Quorum LLM - reviewer backend over an OpenAI-compatible proxy
//!
//! This crate provides the production [`quorum_core::Reviewer`] implementation:
//! a chat-completions client pointed at an OpenAI-compatible endpoint so a
//! single credential covers heterogeneous reviewer models.

mod client;
mod error;

pub use client::{ProxyClient, DEFAULT_BASE_URL};
pub use error::{Error, Result};
