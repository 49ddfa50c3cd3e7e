//! Event processors.
//!
//! - `EventDispatcher`: multiplexes the feeds, classifies raw logs and hands
//!   each decoded event to the handler
//! - `PawnEventHandler`: persists a pawn event, then notifies on success

pub mod dispatcher;
pub mod pawn_handler;

pub use dispatcher::{DispatchError, EventDispatcher};
pub use pawn_handler::{HandleOutcome, HandlerError, PawnEventHandler};
