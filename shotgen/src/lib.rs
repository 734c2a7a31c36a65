//! Five-shot product photo pack generator on the Gemini API.

pub mod client;
pub mod error;
pub mod generator;
pub mod models;
pub mod prompts;
pub mod reference;
pub mod studio;

#[cfg(test)]
mod test_support;

pub use shotgen_types as types;

pub use client::{Client, ClientBuilder, HttpOptions};
pub use error::{Error, Result};
pub use generator::{GeminiImageGenerator, GenerateShot, GeneratedImage, ImageGenerator};
pub use reference::ReferenceImage;
pub use studio::{BatchReport, BatchState, RetryError, Shot, ShotOutcome, Studio, SubmitError};
