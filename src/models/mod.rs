//! Domain models for the radio scheduler
//!
//! Each stored entity has a `*CreateRequest` used to insert it and a `*View`
//! used to expose it. Views carry forward references only, so a serialized
//! program never loops back through its host, details or musics.

pub mod host;
pub mod music;
pub mod program_details;
pub mod radio_program;

pub use host::*;
pub use music::*;
pub use program_details::*;
pub use radio_program::*;

/// Marker for stored entities, naming them in logs and error messages
pub trait Entity {
    /// Human-readable singular name, e.g. `"host"`
    const NAME: &'static str;

    fn id(&self) -> i64;
}
