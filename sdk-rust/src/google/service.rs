use super::api::{
    Candidate, Content, GenerateContentConfig, GenerateContentParameters,
    GenerateContentResponse, GoogleSearch, GroundingChunk, Part as GooglePart, Tool,
};
use crate::{
    client_utils, Citation, Language, ResearchError, ResearchResult, ResearchService,
    SearchResult,
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};

const PROVIDER: &str = "google";

pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const TEMPERATURE: f64 = 0.3;

const NO_RESPONSE_TEXT: &str = "No response generated.";
const UNTITLED_SOURCE: &str = "Untitled Source";
const MISSING_URI: &str = "#";
const SOURCE_LABEL: &str = "Google Search";
const API_KEY_HEADER: &str = "x-goog-api-key";

const SYSTEM_INSTRUCTION_EN: &str = "You are a highly capable academic research assistant designed to help students and researchers.
Your goal is to provide comprehensive, accurate, and well-structured answers to research questions.
Always use a formal, academic tone.
Structure your answer with clear headings.
You have access to Google Search tools; use them to verify facts and find recent papers or articles.";

const SYSTEM_INSTRUCTION_SI: &str = "ඔබ සිසුන්ට සහ පර්යේෂකයන්ට උපකාර කිරීම සඳහා නිර්මාණය කර ඇති ඉහළ හැකියාවක් ඇති අධ්‍යයන පර්යේෂණ සහායකයෙකි.
ඔබගේ ඉලක්කය වන්නේ පර්යේෂණ ප්‍රශ්න සඳහා පුළුල්, නිවැරදි සහ මනාව ව්‍යුහගත පිළිතුරු සැපයීමයි.
සැමවිටම විධිමත්, ශාස්ත්‍රීය ස්වරයක් භාවිතා කරන්න.
පැහැදිලි මාතෘකා සහිතව ඔබේ පිළිතුර සකස් කරන්න.
ඔබට Google Search මෙවලම් වෙත ප්‍රවේශය ඇත; කරුණු තහවුරු කිරීමට සහ මෑත කාලීන ලිපි හෝ ලිපි සොයා ගැනීමට ඒවා භාවිතා කරන්න.
කරුණාකර ඔබේ පිළිතුර සිංහල භාෂාවෙන් ලබා දෙන්න.";

/// Research service backed by Gemini with Google Search grounding.
pub struct GoogleResearchService {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct GoogleResearchOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl GoogleResearchService {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: GoogleResearchOptions) -> Self {
        let GoogleResearchOptions {
            api_key,
            base_url,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(Client::new);
        let headers = headers.unwrap_or_default();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client,
            headers,
        }
    }

    fn request_headers(&self) -> ResearchResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(&self.api_key).map_err(|error| {
            ResearchError::InvalidInput(format!("Invalid Google API key: {error}"))
        })?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                ResearchError::InvalidInput(format!(
                    "Invalid Google header name '{key}': {error}"
                ))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                ResearchError::InvalidInput(format!(
                    "Invalid Google header value for '{key}': {error}"
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    async fn generate(&self, query: &str, language: Language) -> ResearchResult<SearchResult> {
        let params = convert_to_generate_content_parameters(query, language);

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model_id);

        let headers = self.request_headers()?;
        let response: GenerateContentResponse =
            client_utils::send_json(&self.client, &url, &params, headers).await?;

        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| {
                ResearchError::Invariant(PROVIDER, "No candidate in response".to_string())
            })?;

        Ok(map_google_candidate(candidate, current_millis()))
    }
}

#[async_trait::async_trait]
impl ResearchService for GoogleResearchService {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn perform_research(
        &self,
        query: &str,
        language: Language,
    ) -> ResearchResult<SearchResult> {
        crate::opentelemetry::trace_research(
            self.provider(),
            &self.model_id,
            query,
            language,
            || async move {
                self.generate(query, language).await.map_err(|error| {
                    tracing::error!(%error, provider = PROVIDER, "research request failed");
                    ResearchError::unavailable()
                })
            },
        )
        .await
    }
}

fn system_instruction(language: Language) -> &'static str {
    match language {
        Language::En => SYSTEM_INSTRUCTION_EN,
        Language::Si => SYSTEM_INSTRUCTION_SI,
    }
}

fn convert_to_generate_content_parameters(
    query: &str,
    language: Language,
) -> GenerateContentParameters {
    GenerateContentParameters {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: Some(vec![GooglePart {
                text: Some(query.to_string()),
                ..Default::default()
            }]),
        }],
        tools: Some(vec![Tool {
            google_search: Some(GoogleSearch {}),
        }]),
        system_instruction: Some(Content {
            role: Some("system".to_string()),
            parts: Some(vec![GooglePart {
                text: Some(system_instruction(language).to_string()),
                ..Default::default()
            }]),
        }),
        generation_config: Some(GenerateContentConfig {
            temperature: Some(TEMPERATURE),
            ..Default::default()
        }),
    }
}

fn map_google_candidate(candidate: Candidate, now_millis: u128) -> SearchResult {
    let text: String = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought.unwrap_or(false))
        .filter_map(|part| part.text)
        .collect();

    let text = if text.is_empty() {
        NO_RESPONSE_TEXT.to_string()
    } else {
        text
    };

    let chunks = candidate
        .grounding_metadata
        .and_then(|metadata| metadata.grounding_chunks)
        .unwrap_or_default();

    SearchResult::new(text, map_grounding_chunks(chunks, now_millis))
}

fn map_grounding_chunks(chunks: Vec<GroundingChunk>, now_millis: u128) -> Vec<Citation> {
    chunks
        .into_iter()
        .enumerate()
        .filter_map(|(index, chunk)| {
            let web = chunk.web?;
            Some(
                Citation::new(
                    format!("src-{now_millis}-{index}"),
                    web.title.unwrap_or_else(|| UNTITLED_SOURCE.to_string()),
                    web.uri.unwrap_or_else(|| MISSING_URI.to_string()),
                )
                .with_source(SOURCE_LABEL),
            )
        })
        .collect()
}

fn current_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
