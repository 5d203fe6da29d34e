//! Repository pattern implementation for data access
//!
//! This module provides a clean abstraction layer over the SQLite database.
//! Services only ever see the traits in [`traits`]; the `*Repository` structs
//! are the sqlx implementations sharing one connection pool.
//!
//! # Usage
//!
//! ```rust,ignore
//! use radio_scheduler::repositories::{RadioProgramRepository, RadioProgramStore};
//!
//! async fn on_air(repo: RadioProgramRepository) {
//!     let programs = repo.find_by_time(chrono::Utc::now()).await?;
//!     // ... use programs
//! }
//! ```

pub mod host;
pub mod music;
pub mod program_details;
pub mod radio_program;
pub mod traits;

// Re-export main traits and types
pub use host::HostRepository;
pub use music::MusicRepository;
pub use program_details::ProgramDetailsRepository;
pub use radio_program::RadioProgramRepository;
pub use traits::*;
