//! Web API module for Sharebox.
//!
//! This module provides the REST API for accounts, tenant files and share
//! links, plus optional static serving of the frontend.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
