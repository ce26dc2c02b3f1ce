//! Core invoice types, totals arithmetic, and the status state machine.
//!
//! Everything here is pure: no I/O, no shared state. Functions can be
//! called from any number of threads at once.

mod builder;
mod config;
mod error;
mod status;
mod totals;
mod types;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use status::*;
pub use totals::*;
pub use types::*;
