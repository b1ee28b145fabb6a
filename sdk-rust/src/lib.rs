mod client_utils;
mod errors;
pub mod google;
mod opentelemetry;
mod research_service;
pub mod scholar_sdk_test;
mod types;
mod types_ext;

pub use errors::*;
pub use research_service::ResearchService;
pub use types::{Citation, Language, SearchResult};
pub use types_ext::dedupe_by_uri;
