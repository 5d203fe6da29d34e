//! Centralized error handling for the radio scheduler
//!
//! # Error Categories
//!
//! - **Validation Errors**: a referenced host, program details or music id does not resolve
//! - **Not Found Errors**: the targeted radio program does not exist
//! - **Conflict Errors**: a music track is already on the program, or a concurrent write won
//! - **Store Errors**: persistence failures, surfaced per operation without internal detail
//!
//! # Usage
//!
//! ```rust
//! use radio_scheduler::errors::{AppError, AppResult};
//!
//! fn example_function(host_found: bool) -> AppResult<()> {
//!     if !host_found {
//!         return Err(AppError::validation("Invalid Host or ProgramDetails ID"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;
