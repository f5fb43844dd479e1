//! Shared foundations for indexpilot: the error type and the keyed set
//! collection every other crate builds on.

pub mod error;
pub mod set;

pub use error::{Error, Result};
pub use set::{comb_set, Keyed, Set};
