//! Server-rendered views for the post pages and controls.

pub mod ui;
pub mod views;
