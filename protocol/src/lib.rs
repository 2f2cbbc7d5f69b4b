//! Wire format shared by the game service and its clients.
//!
//! Boards travel as rows of strings: `" "` for a hidden cell, `"0"`..`"8"` for a revealed
//! count, `"X"` for the mine that ended the game and `"B"` for every other mine.

pub use board::*;
pub use messages::*;

mod board;
mod messages;
