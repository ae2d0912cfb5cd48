//! HTTP API handlers

pub mod align;
pub mod health;

pub use align::{align_recitation, align_routes, AlignmentResponse};
pub use health::{health_check, health_routes, HealthResponse};
