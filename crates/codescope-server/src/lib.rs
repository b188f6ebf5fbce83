//! Codescope Server Library
//!
//! axum HTTP API exposing the project analyzer and the chat proxy.

pub mod error;
pub mod handlers;
pub mod models;
pub mod server;
pub mod service;
pub mod upload;

pub use handlers::{AppState, SharedState};
pub use server::{build_router, start};
