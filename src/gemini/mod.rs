//! Google Gemini API client

mod client;

pub use client::{
    DEFAULT_GEMINI_API_HOST, DEFAULT_GEMINI_MODEL, GeminiClient, GenerationError,
    SharedGenerator, TextGenerator,
};
