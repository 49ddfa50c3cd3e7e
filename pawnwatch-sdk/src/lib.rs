//! Wire types and HTTP clients for the pawn backend.
//!
//! The HTTP clients live behind the `client` feature so that consumers
//! which only need the payload types do not pull in `reqwest`.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;
