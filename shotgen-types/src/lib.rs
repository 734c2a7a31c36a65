//! Shared types for the ShotGen product photo pack generator.

mod base64_serde;

pub mod config;
pub mod content;
pub mod enums;
pub mod models;
pub mod response;
pub mod shots;
