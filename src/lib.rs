pub mod assets;
pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod seed;
pub mod services;
pub mod utils;
pub mod web;
