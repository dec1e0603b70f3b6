//! Alert operations
//!
//! Validation and the store call are kept as separate steps: input is
//! rejected in full before anything is persisted.

mod service;
pub mod validation;

pub use service::AlertService;
pub use validation::{ListQuery, PageLimits};
