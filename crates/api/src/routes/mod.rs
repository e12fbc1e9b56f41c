//! HTTP route handlers.

pub mod categories;
pub mod gifts;
pub mod members;
pub mod options;
pub mod products;
pub mod system;
