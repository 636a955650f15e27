//! Console logger: `tracing` events formatted by `tracing-subscriber`.
//!
//! In the browser each event becomes one devtools console call at the
//! event's level, through `tracing-web`. Elsewhere (tests) events go to
//! stderr.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Calling twice is harmless.
pub fn init(level: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .without_time() // no wall clock on wasm32-unknown-unknown
        .with_writer(writer());
    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt_layer)
        .try_init();
}

/// The configured directive, or `info` when it does not parse.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(target_arch = "wasm32")]
fn writer() -> tracing_web::MakeWebConsoleWriter {
    tracing_web::MakeWebConsoleWriter::new()
}

#[cfg(not(target_arch = "wasm32"))]
fn writer() -> fn() -> std::io::Stderr {
    std::io::stderr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directive_is_used() {
        assert_eq!(filter("debug").to_string(), "debug");
        assert_eq!(filter("pixel_clicker=trace").to_string(), "pixel_clicker=trace");
    }

    #[test]
    fn unparsable_directive_falls_back_to_info() {
        assert_eq!(filter("pixel_clicker=loud").to_string(), "info");
    }

    #[test]
    fn init_twice_is_harmless() {
        init("warn");
        init("debug");
        tracing::warn!("still logging");
    }
}
