//! # Clientauth Core
//!
//! Foundational types shared by every clientauth crate:
//!
//! - [`errors`]: the [`AppError`] type and the failure body it renders
//!
//! Failure bodies always take the shape `{"code": -1, "message": "..."}`,
//! the same shape the remote user service uses for its own failures.

pub mod errors;

pub use axum::http::StatusCode;
pub use errors::{AppError, ErrorBody, FAILURE_CODE};
