//! Consumer-side mock endpoint for contract tests.
//!
//! A test declares interactions through [`ContractBuilder`], starts a mock
//! endpoint on an ephemeral local port, points the client under test at it,
//! and finishes the session to obtain the contract artifact. Unmatched
//! requests and unexercised interactions fail the session.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod registry;
pub mod server;
pub mod session;

pub use registry::InteractionRegistry;
pub use server::MockServer;
pub use session::{ContractBuilder, ContractSession, InteractionBuilder};
