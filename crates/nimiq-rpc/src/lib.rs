//! JSON-RPC client for Nimiq blockchain nodes.
//!
//! Two pieces do the work: the dispatcher ([`Client`]) builds request
//! envelopes with sequenced ids and resolves one reply per call — awaited,
//! blocking, or via callback — and the response decoder ([`decode::FromJson`])
//! turns raw `result` payloads into typed values, resolving polymorphic
//! shapes by structural trial. Typed wrappers for the node's RPC methods
//! live on [`Client`] directly.

pub mod client;
pub mod decode;
pub mod error;
mod methods;
mod protocol;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::Client;
pub use error::{DecodeError, RpcError};
pub use transport::{HttpTransport, Transport};
