//! HTTP request handlers organized by resource
//!
//! Handlers stay thin: decode the request, call one service method and map
//! the result through [`crate::web::responses`].

pub mod health;
pub mod hosts;
pub mod musics;
pub mod program_details;
pub mod radio_programs;
