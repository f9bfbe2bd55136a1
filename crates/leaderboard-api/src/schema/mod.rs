//! # Request and Response Types
//!
//! JSON bodies and query strings of the HTTP API.

pub mod inputs;
pub mod objects;

pub use inputs::*;
pub use objects::*;
