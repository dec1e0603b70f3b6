//! Data models for visa-alerts

mod alert;
mod query;

pub use alert::*;
pub use query::*;
