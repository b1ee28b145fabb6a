pub mod api;
mod service;

pub use service::{GoogleResearchOptions, GoogleResearchService, DEFAULT_MODEL_ID};
