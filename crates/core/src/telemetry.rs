//! Sentry and tracing setup shared by the API server and the CLI.

use crate::config::Settings;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Where console logs are written. The CLI keeps stdout for report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    Stderr,
}

/// Holds the Sentry client and the file log writer; keep it alive until `main` returns.
pub struct TelemetryGuard {
    _sentry: Option<sentry::ClientInitGuard>,
    _log: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Sentry first so the tracing layer has a client to forward to.
pub fn init(settings: &Settings, app: &str, console: Console) -> TelemetryGuard {
    TelemetryGuard {
        _sentry: client_options(settings, app).map(sentry::init),
        _log: init_tracing(settings, app, console),
    }
}

/// `None` when no DSN is configured or the configured one does not parse.
pub fn client_options(settings: &Settings, app: &str) -> Option<sentry::ClientOptions> {
    let raw = settings.sentry_dsn.as_deref()?;
    let dsn = match raw.parse::<sentry::types::Dsn>() {
        Ok(dsn) => dsn,
        Err(e) => {
            // Tracing is not up yet.
            eprintln!("SENTRY_DSN is not valid, error reporting disabled: {e}");
            return None;
        }
    };
    Some(sentry::ClientOptions {
        dsn: Some(dsn),
        release: Some(format!("localmind-{app}@{}", env!("CARGO_PKG_VERSION")).into()),
        environment: settings.sentry_environment.clone().map(Into::into),
        ..Default::default()
    })
}

pub fn log_file_name(app: &str) -> String {
    format!("localmind-{app}.log")
}

/// Console logging always; a daily rolling file as well when `LOCALMIND_LOG_DIR` is set.
fn init_tracing(
    settings: &Settings,
    app: &str,
    console: Console,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let (file_layer, guard) = match settings.log_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, log_file_name(app));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_writer = match console {
        Console::Stdout => BoxMakeWriter::new(std::io::stdout),
        Console::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(console_writer))
        .with(file_layer)
        .with(sentry_tracing::layer())
        .init();

    guard
}
