use crate::{
    types::SearchResultSnapshot, Citation, Language, ResearchError, SearchResult,
};
use std::{collections::HashSet, fmt, str::FromStr};

impl Citation {
    pub fn new(id: impl Into<String>, title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            uri: uri.into(),
            snippet: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// A plain-text reference suitable for pasting into a document.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{} - {}", self.title, self.uri)
    }
}

impl SearchResult {
    /// Create a result, dropping every source whose `uri` was already seen.
    /// The first occurrence of each `uri` is kept in place.
    pub fn new(text: impl Into<String>, sources: impl IntoIterator<Item = Citation>) -> Self {
        Self {
            text: text.into(),
            sources: dedupe_by_uri(sources),
        }
    }

    #[must_use]
    pub fn sources(&self) -> &[Citation] {
        &self.sources
    }

    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Citation>) {
        (self.text, self.sources)
    }
}

impl From<SearchResultSnapshot> for SearchResult {
    fn from(value: SearchResultSnapshot) -> Self {
        Self::new(value.text, value.sources)
    }
}

/// Keep the first citation for each distinct `uri`, preserving order.
pub fn dedupe_by_uri(citations: impl IntoIterator<Item = Citation>) -> Vec<Citation> {
    let mut seen = HashSet::new();
    citations
        .into_iter()
        .filter(|citation| seen.insert(citation.uri.clone()))
        .collect()
}

impl Language {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Si => "si",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "si" => Ok(Self::Si),
            other => Err(ResearchError::InvalidInput(format!(
                "Unsupported language tag '{other}'"
            ))),
        }
    }
}
