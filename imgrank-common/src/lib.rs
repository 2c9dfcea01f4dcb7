//! # imgrank Common Library
//!
//! Shared code for the image ranking service:
//! - Configuration loading and resolution
//! - Image folder enumeration
//! - Point schedule for ranked submissions
//! - Persistent tally store (schema, ranking commit, leaderboard)

pub mod config;
pub mod db;
pub mod error;
pub mod images;
pub mod scoring;

pub use db::TallyEntry;
pub use error::{Error, Result};
