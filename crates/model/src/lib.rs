//! Provider-neutral types for talking to chat-completion models.
//!
//! The agent only ever speaks in terms of the types defined here. Each
//! model backend translates them to and from its own wire format, so the
//! agent loop never needs to know which backend it is driving.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
