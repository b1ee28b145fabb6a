use scholar_session::{
    LocalIdentity, ResearchSession, ResearchSessionParams, ScholarConfig, SubmitOutcome, UserId,
};
use std::{error::Error, sync::Arc};
use tracing_subscriber::EnvFilter;

// Usage: cargo run --example research -- "History of Quantum Computing"
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ScholarConfig::from_env()?;
    let query = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let query = if query.trim().is_empty() {
        "History of Quantum Computing".to_string()
    } else {
        query
    };

    let session = ResearchSession::new(
        ResearchSessionParams::new(Arc::new(config.research_service()?))
            .blob_store(config.citation_blob_store())
            .identity(Arc::new(LocalIdentity::signed_in(UserId::new("demo-user"))))
            .language(config.default_language),
    );

    let state = session.state();
    match session.submit(&query, state.language).await {
        SubmitOutcome::Completed => {}
        SubmitOutcome::Failed => {
            let state = session.state();
            eprintln!("{}", state.error().unwrap_or_default());
            return Ok(());
        }
        SubmitOutcome::Ignored | SubmitOutcome::Superseded => return Ok(()),
    }

    let state = session.state();
    if let Some(result) = state.result() {
        println!("{}\n", result.text);
    }

    println!("Sources:");
    for view in session.source_views() {
        let badge = if view.saved { "saved" } else { "new" };
        println!("  [{badge}] {}", view.citation.reference());
    }

    if let Some(first) = session.source_views().into_iter().find(|view| !view.saved) {
        session.save_citation(first.citation);
    }
    println!("\nBibliography: {} citation(s)", session.citations().len());

    session.flush_history().await;
    println!("History: {} item(s)", session.history().len());

    Ok(())
}
