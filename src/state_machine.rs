//! Menu-tree conversation state machine
//!
//! Pure transitions: the runtime owns I/O, this module only decides what to
//! reply and where the session moves next.

pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use state::{SessionKey, SessionState};
pub use transition::transition;
