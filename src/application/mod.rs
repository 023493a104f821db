//! Application services: post actions, session state, and control bookkeeping.

pub mod controls;
pub mod error;
pub mod posts;
pub mod repos;
pub mod session;
pub mod stream;
