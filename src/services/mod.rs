//! Service layer for business logic
//!
//! Services sit between the web handlers and the repositories. They depend on
//! the repository traits, convert repository failures into [`AppError`]s and
//! log every business operation.
//!
//! - [`EntityService`] is the plain CRUD wrapper used for hosts, musics and
//!   program details.
//! - [`RadioProgramService`] owns the program aggregate: reference validation,
//!   end time maintenance and the outward projection.
//!
//! [`AppError`]: crate::errors::AppError

pub mod entity;
pub mod radio_program;

pub use entity::{EntityService, HostService, MusicService, ProgramDetailsService};
pub use radio_program::{RadioProgramService, SqliteRadioProgramService};
