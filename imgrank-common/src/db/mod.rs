//! Persistent tally store
//!
//! One SQLite table maps image file name to accumulated points. Opening the
//! database never creates tables; [`migrate`] is the explicit init step.

pub mod init;
pub mod migrations;
pub mod tally;

pub use init::*;
pub use migrations::*;
pub use tally::*;
