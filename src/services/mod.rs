//! Services — request pipelines invoked by the route handlers.

pub mod wish;
