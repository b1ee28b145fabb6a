use serde::{Deserialize, Serialize};

/// A reference to an external source surfaced by the research service as
/// supporting evidence for an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    /// Opaque identifier. Unique within a bibliography but not stable across
    /// research runs for the same source.
    pub id: String,
    /// Display title of the source.
    pub title: String,
    /// Canonical locator of the source. Used as the deduplication key.
    pub uri: String,
    /// A short excerpt of the source, if the service provided one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub snippet: Option<String>,
    /// Where the source was found (e.g. "Google Search").
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>,
}

/// The answer to a research query together with its grounding sources.
///
/// `sources` never contains two citations with the same `uri`. The order is the
/// order in which each `uri` was first seen in the service response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "SearchResultSnapshot")]
pub struct SearchResult {
    /// The generated answer body, formatted as markdown.
    pub text: String,
    pub(crate) sources: Vec<Citation>,
}

/// Wire shape of a [`SearchResult`]. Deserialized snapshots are normalized
/// through [`SearchResult::new`] so that stored data cannot break the
/// uniqueness of `sources`.
#[derive(Deserialize)]
pub(crate) struct SearchResultSnapshot {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<Citation>,
}

/// The language a research query is answered in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Sinhala
    Si,
}
