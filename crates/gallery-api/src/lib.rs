//! # gallery-api
//!
//! REST API for the gallery backend.
//!
//! This crate provides:
//! - CRUD endpoints for artworks, exhibitions, visitors, staff, loans,
//!   insurance and restorations
//! - Dashboard statistics and warehouse reports
//! - The warehouse sync trigger and its audit log
//! - One JSON error envelope for every failure, classified through the
//!   Oracle error table

pub mod dto;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
pub mod test_helpers;

pub use error::{ApiError, ErrorResponse, FieldError};
pub use server::{ApiServer, ApiServerConfig};
pub use state::AppState;
