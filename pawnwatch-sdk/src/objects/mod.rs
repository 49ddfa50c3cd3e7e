//! Wire objects exchanged with the pawn backend.

pub mod notification;
pub mod pawn;

pub use notification::Notification;
pub use pawn::{InsertPawnRequest, PawnStatus, UnknownPawnStatus, UpdatePawnRequest};
