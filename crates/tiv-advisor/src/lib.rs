//! Advice synthesis for TIV
//!
//! This crate provides the LLM implementation of the AdviceSynthesizer
//! trait, against any OpenAI-compatible chat-completions endpoint.

mod client;
mod config;


pub use client::AdvisorClient;
pub use config::AdvisorConfig;

// Re-export core types for convenience
pub use tiv_core::{Advice, AdviceSynthesizer};
