//! # HTTP Handlers
//!
//! Leaderboard endpoints and the login flow.

pub mod auth;
pub mod leaderboard;

pub use auth::{login, logout, oauth_callback, user_status};
pub use leaderboard::{get_leaderboard, submit_score};
