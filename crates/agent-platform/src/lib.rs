//! A tool-using chat agent wired to an OpenAI-compatible endpoint.
//!
//! The crate loads configuration and a secrets directory, builds the model
//! provider, and assembles a session around a fixed toolset. It also ships a
//! CLI that runs a few prompts through the agent and prints the
//! conversation.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod config;
pub mod llm;
pub mod secrets;
mod session;
pub mod tools;

pub use config::Config;
pub use secrets::Secrets;
pub use session::{Session, SessionBuilder};

/// Re-exports of [`agent_platform_core`] crate.
pub mod core {
    pub use agent_platform_core::*;
}
