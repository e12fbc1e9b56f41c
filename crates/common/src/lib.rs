//! Shared types for the gift catalog service.

mod ids;

pub use ids::{CategoryId, MemberId, OptionId, ProductId};
