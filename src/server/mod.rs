//! The mock server
//!
//! Sequential dispatch over the framed transport, shared process-lifetime
//! state, and the detached delayed-response scheduling used for hover.

pub mod dispatcher;
pub mod hover;
pub mod outbound;
pub mod progress;
pub mod state;

#[cfg(test)]
pub mod testing;

pub use dispatcher::Server;
