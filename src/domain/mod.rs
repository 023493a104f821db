//! Domain layer: post entities, identifiers, and request schemas.

pub mod entities;
pub mod error;
pub mod posts;
pub mod types;
