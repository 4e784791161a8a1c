mod corpus;

use std::process::ExitCode;

use ai_llm_service::telemetry;
use colored::Colorize;
use contextor::{ContextorConfig, ContextorError, IndicatifProgress, Pipeline};
use rag_store::SearchHit;
use services::EnvFile;
use tracing::{Level, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ENV_PATH: &str = ".env";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("warn", Level::INFO))
        .with(telemetry::layer())
        .init();

    let env = match EnvFile::load(ENV_PATH) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let queries: Vec<String> = std::env::args().skip(1).collect();
    let queries: Vec<&str> = if queries.is_empty() {
        corpus::DEFAULT_QUERIES.to_vec()
    } else {
        queries.iter().map(String::as_str).collect()
    };

    match run(&env, &queries).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "pipeline failed");
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(env: &EnvFile, queries: &[&str]) -> Result<(), ContextorError> {
    let cfg = ContextorConfig::from_env_file(env)?;
    let pipeline = Pipeline::from_config(&cfg)?;

    println!("{}", "Collection contents:".bold());
    for (idx, doc) in corpus::DOCUMENTS.iter().enumerate() {
        println!("[{idx}]\t{doc}");
    }

    let progress = IndicatifProgress::bar(corpus::DOCUMENTS.len() as u64);
    let report = pipeline.ingest(corpus::DOCUMENTS, &progress).await?;
    if report.recreated {
        println!(
            "Collection '{}' already existed and was rebuilt.",
            report.collection
        );
    }

    for (n, query) in queries.iter().enumerate() {
        println!();
        println!("{}", format!("########## QUERY {} ##########", n + 1).cyan().bold());
        answer_query(&pipeline, query).await?;
    }

    Ok(())
}

async fn answer_query(pipeline: &Pipeline, query: &str) -> Result<(), ContextorError> {
    println!("{} {query}", "Query:".bold());

    let hits = pipeline.retrieve(query).await?;
    for line in retrieval_lines(&hits) {
        println!("{line}");
    }

    // Zero hits yield `None` and nothing more is printed.
    if let Some(qa) = pipeline.answer_with_hits(query, hits).await? {
        println!("{} {}", "Answer:".green().bold(), qa.answer);
    }
    Ok(())
}

/// One `[id - score] text` line per hit, then the generation notice.
/// Empty when nothing was retrieved.
fn retrieval_lines(hits: &[SearchHit]) -> Vec<String> {
    let mut lines: Vec<String> = hits
        .iter()
        .map(|hit| format!("[{} - {}] {}", hit.id, hit.score, hit.text))
        .collect();
    if !hits.is_empty() {
        lines.push(format!(
            "Generating answer with {} context documents...",
            hits.len()
        ));
    }
    lines
}
