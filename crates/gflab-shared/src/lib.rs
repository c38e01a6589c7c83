//! # GFLab Shared
//!
//! Request/response types shared between the community API server and its
//! clients, plus the standard error envelope.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
