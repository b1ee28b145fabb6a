use crate::{Language, ResearchResult, SearchResult};
use opentelemetry::trace::Status;
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct ResearchSpan {
    span: Span,
    start_time: Instant,
    source_count: Option<usize>,
    answer_length: Option<usize>,
}

impl ResearchSpan {
    pub fn new(provider: &str, model_id: &str, language: Language, query: &str) -> Self {
        let span = info_span!("scholar_sdk.research");
        span.set_attribute("gen_ai.operation.name", "generate_content");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("gen_ai.request.model", model_id.to_string());
        span.set_attribute("scholar.language", language.as_str());
        span.set_attribute(
            "scholar.query.length",
            i64::try_from(query.chars().count()).unwrap_or(i64::MAX),
        );

        Self {
            span,
            start_time: Instant::now(),
            source_count: None,
            answer_length: None,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_response(&mut self, result: &SearchResult) {
        self.source_count = Some(result.sources().len());
        self.answer_length = Some(result.text.len());
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if let Some(source_count) = self.source_count {
            self.span.set_attribute(
                "scholar.source_count",
                i64::try_from(source_count).unwrap_or(i64::MAX),
            );
        }
        if let Some(answer_length) = self.answer_length {
            self.span.set_attribute(
                "scholar.answer.length",
                i64::try_from(answer_length).unwrap_or(i64::MAX),
            );
        }
        self.span
            .set_attribute("scholar.duration_seconds", self.start_time.elapsed().as_secs_f64());
    }
}

pub async fn trace_research<F, Fut>(
    provider: &str,
    model_id: &str,
    query: &str,
    language: Language,
    f: F,
) -> ResearchResult<SearchResult>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ResearchResult<SearchResult>>,
{
    let mut span = ResearchSpan::new(provider, model_id, language, query);
    let result = span.instrument_future(f()).await;

    match &result {
        Ok(response) => span.on_response(response),
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}
