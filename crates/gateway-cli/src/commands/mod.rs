//! CLI commands module.

pub mod chat;
pub mod config;
pub mod image;
pub mod speech;
pub mod video;
