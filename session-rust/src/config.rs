use crate::{
    blob_store::{BlobStore, FileBlobStore, MemoryBlobStore},
    ConfigError,
};
use scholar_sdk::{
    google::{GoogleResearchOptions, GoogleResearchService, DEFAULT_MODEL_ID},
    Language,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};

/// Runtime configuration of a research session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScholarConfig {
    pub api_key: String,
    pub model_id: String,
    /// Overrides the Gemini API endpoint.
    pub base_url: Option<String>,
    /// Directory for locally persisted data. Without one, saved citations
    /// live only as long as the process.
    pub data_dir: Option<PathBuf>,
    pub default_language: Language,
}

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            base_url: None,
            data_dir: None,
            default_language: Language::default(),
        }
    }
}

impl ScholarConfig {
    /// Read the configuration from the environment, after loading a `.env`
    /// file if one exists.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY` | `api_key` (required) |
    /// | `SCHOLAR_MODEL` | `model_id` |
    /// | `SCHOLAR_BASE_URL` | `base_url` |
    /// | `SCHOLAR_DATA_DIR` | `data_dir` |
    /// | `SCHOLAR_LANGUAGE` (`en` or `si`) | `default_language` |
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source. Blank
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = var("GEMINI_API_KEY")
            .or_else(|| var("GOOGLE_API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let default_language = match var("SCHOLAR_LANGUAGE") {
            Some(language) => language
                .trim()
                .parse()
                .map_err(ConfigError::InvalidLanguage)?,
            None => Language::default(),
        };

        Ok(Self {
            api_key,
            model_id: var("SCHOLAR_MODEL").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            base_url: var("SCHOLAR_BASE_URL"),
            data_dir: var("SCHOLAR_DATA_DIR").map(PathBuf::from),
            default_language,
        })
    }

    pub fn google_options(&self) -> Result<GoogleResearchOptions, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(GoogleResearchOptions {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            ..GoogleResearchOptions::default()
        })
    }

    pub fn research_service(&self) -> Result<GoogleResearchService, ConfigError> {
        Ok(GoogleResearchService::new(
            self.model_id.clone(),
            self.google_options()?,
        ))
    }

    /// File-backed store under `data_dir`, or an in-memory store when no
    /// directory is configured.
    #[must_use]
    pub fn citation_blob_store(&self) -> Arc<dyn BlobStore> {
        match &self.data_dir {
            Some(dir) => Arc::new(FileBlobStore::new(dir.clone())),
            None => Arc::new(MemoryBlobStore::new()),
        }
    }
}
