use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Targets of the workspace crates; `level_directives` applies to these only.
pub const WORKSPACE_TARGETS: &[&str] = &[
    "persona_chat",
    "api",
    "contextor",
    "rag_store",
    "answer_normalizer",
    "ai_llm_service",
];

/// RFC3339 UTC timer implemented via `chrono`.
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

/// Build the formatting layer used by the server binary.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with target and `file:line`
/// - Span close events (duration at the end of instrumented calls)
/// - ANSI colors only when stdout is a terminal
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
}

/// Level directives for every workspace crate, e.g. `contextor=debug`.
pub fn level_directives(level: Level) -> Vec<Directive> {
    WORKSPACE_TARGETS
        .iter()
        .filter_map(|target| {
            let s = format!("{target}={}", level.as_str().to_lowercase());
            Directive::from_str(&s).ok()
        })
        .collect()
}

/// Create an `EnvFilter` from `RUST_LOG` or the fallback `default`, then raise
/// the workspace crates to `level`.
///
/// With `default = "warn"` and `level = Level::INFO`, dependencies log at WARN
/// while the backend itself logs at INFO.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return from_env;
    }
    level_directives(level)
        .into_iter()
        .fold(EnvFilter::new(default), EnvFilter::add_directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_crate() {
        let directives = level_directives(Level::DEBUG);
        assert_eq!(directives.len(), WORKSPACE_TARGETS.len());
        assert_eq!(directives[1].to_string(), "api=debug");
    }
}
