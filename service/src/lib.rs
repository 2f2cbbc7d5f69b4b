//! Request handling for the game: validates input, runs the core against an owner-scoped
//! store and maps every failure to a status the transport can return as is.
//!
//! Authentication and transport framing live outside this crate; every entry point takes
//! an already resolved [`OwnerId`](sweeper_core::OwnerId).

pub use error::*;
pub use seed::*;
pub use service::*;
pub use store::*;

mod error;
mod seed;
mod service;
mod store;
