//! Observability module - tracing, request IDs, and alerting.

mod alert;
mod request_id;

pub use alert::{AlertConfig, AlertLayer, AlertSender};
pub use request_id::RequestIdMiddleware;
