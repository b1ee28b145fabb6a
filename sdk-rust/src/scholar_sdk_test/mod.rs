mod service;

pub use service::{MockResearchCall, MockResearchResult, MockResearchService};
