//! Grounded assortment analysis for a single competitor brand.

pub mod client;
pub mod error;
pub mod prompt;

mod parse;
mod types;

pub use client::{Analysis, GeminiClient};
pub use error::AnalyzerError;
