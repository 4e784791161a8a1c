use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefixes of the pipeline crates; events from other crates are dropped.
pub const TARGET_PREFIXES: &[&str] = &[
    "rag_pipeline",
    "contextor",
    "rag_store",
    "ai_llm_service",
    "services",
];

/// RFC3339 UTC timer implemented via `chrono` (no extra features).
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Formatting layer that renders only events emitted by the pipeline crates.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with `file:line`
/// - Span close events (duration of instrumented HTTP calls)
/// - ANSI colors only when stderr is a terminal
///
/// Logs go to stderr so stdout stays reserved for answers.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stderr().is_terminal();

    let only_ours = filter::filter_fn(|meta| {
        TARGET_PREFIXES
            .iter()
            .any(|p| meta.target().starts_with(p))
    });

    let format = fmt::format()
        .compact()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(format)
        .with_filter(only_ours)
}

/// Level directives for every pipeline crate, e.g. `contextor=debug`.
pub fn level_directives(level: Level) -> Vec<Directive> {
    let lvl = level.as_str().to_lowercase();
    TARGET_PREFIXES
        .iter()
        .filter_map(|p| format!("{p}={lvl}").parse().ok())
        .collect()
}

/// `EnvFilter` from `RUST_LOG`, or `default` when unset, with the pipeline
/// crates raised to `level`.
///
/// With `default = "warn"` and `level = Level::INFO`, third-party crates log at
/// WARN and the pipeline at INFO.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let from_env = EnvFilter::try_from_default_env();
    let explicit = from_env.is_ok();
    let mut filter = from_env.unwrap_or_else(|_| EnvFilter::new(default));
    if !explicit {
        for d in level_directives(level) {
            filter = filter.add_directive(d);
        }
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_crate() {
        let ds = level_directives(Level::DEBUG);
        assert_eq!(ds.len(), TARGET_PREFIXES.len());
        assert!(ds.iter().any(|d| d.to_string() == "contextor=debug"));
    }
}
