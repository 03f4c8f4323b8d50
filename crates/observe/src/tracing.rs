use {
    tracing::level_filters::LevelFilter,
    tracing_subscriber::{EnvFilter, fmt, prelude::*, util::SubscriberInitExt},
};

/// How log lines get written to stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Human readable, colored when stderr is a terminal.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Installs the global tracing subscriber.
///
/// Panics if a global subscriber was already installed, so call it once from
/// `main`.
pub fn initialize(env_filter: &str, format: Format) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(env_filter);

    match format {
        Format::Pretty => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(atty::is(atty::Stream::Stderr))
                    .with_filter(filter),
            )
            .init(),
        Format::Json => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .init(),
    }

    tracing::debug!(%env_filter, ?format, "initialized tracing");
}
