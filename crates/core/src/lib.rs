//! Core business logic for aerodict.

pub mod services;

pub use services::*;
