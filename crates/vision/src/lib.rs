//! Vision analyzer integration.
//!
//! Sends venue photos to an OpenAI-compatible chat-completions endpoint
//! and decodes the analyzer's JSON verdict into typed annotations from
//! `wheelway-core`.

pub mod client;
pub mod parser;
pub mod prompt;

pub use client::{VisionClient, VisionConfig, VisionError};
pub use parser::parse_annotation;
