//! Tracing subscriber setup.
//!
//! ```rust,ignore
//! use courier_runtime::{config::ConfigLoader, logging};
//!
//! let config = ConfigLoader::new().load()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! `RUST_LOG`, when set, replaces the configured base level. Per-module
//! filters from the configuration are always added on top.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig};

const DEFAULT_LOG_FILE: &str = "courier.log";

/// Which span lifecycle events are emitted as log lines.
///
/// Dispatch and polling run inside spans, so `LIFECYCLE` shows how long each
/// update took without the enter/exit noise of every await point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanEvents {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEvents {
    pub const NONE: Self = Self {
        new: false,
        enter: false,
        exit: false,
        close: false,
    };

    pub const LIFECYCLE: Self = Self {
        new: true,
        enter: false,
        exit: false,
        close: true,
    };

    pub const FULL: Self = Self {
        new: true,
        enter: true,
        exit: true,
        close: true,
    };

    pub const ACTIVE: Self = Self {
        new: false,
        enter: true,
        exit: true,
        close: false,
    };

    fn to_fmt_span(self) -> FmtSpan {
        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(FmtSpan::NONE, |acc, (_, span)| acc | span)
    }
}

impl From<&SpanEventConfig> for SpanEvents {
    fn from(config: &SpanEventConfig) -> Self {
        Self {
            new: config.new,
            enter: config.enter,
            exit: config.exit,
            close: config.close,
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    if let Err(e) = LoggingBuilder::from_config(config).try_init() {
        warn!(error = %e, "Logging already initialized");
    }
}

/// Builder for the global tracing subscriber.
///
/// ```rust,ignore
/// LoggingBuilder::new()
///     .level(LogLevel::Debug)
///     .directive("courier_transport=trace")
///     .span_events(SpanEvents::LIFECYCLE)
///     .init();
/// ```
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: LogLevel,
    directives: Vec<String>,
    span_events: SpanEvents,
    format: LogFormat,
    output: LogOutput,
    file_path: Option<PathBuf>,
    thread_ids: bool,
    file_location: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            directives: Vec::new(),
            span_events: SpanEvents::NONE,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            thread_ids: false,
            file_location: false,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut directives: Vec<String> = config
            .filters
            .iter()
            .map(|(module, level)| format!("{module}={level}"))
            .collect();
        // HashMap order is unstable.
        directives.sort();

        Self {
            level: config.level,
            directives,
            span_events: SpanEvents::from(&config.span_events),
            format: config.format,
            output: config.output,
            file_path: config.file_path.clone(),
            thread_ids: config.thread_ids,
            file_location: config.file_location,
        }
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Adds an `EnvFilter` directive such as `courier_runtime=debug`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    pub fn file_location(mut self, enabled: bool) -> Self {
        self.file_location = enabled;
        self
    }

    fn build_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));

        for directive in &self.directives {
            match directive.parse() {
                Ok(parsed) => filter = filter.add_directive(parsed),
                Err(e) => eprintln!("Ignoring invalid log filter {directive:?}: {e}"),
            }
        }
        filter
    }

    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber.
    ///
    /// # Errors
    ///
    /// Fails if a global subscriber is already set.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let span_events = self.span_events.to_fmt_span();

        if self.format == LogFormat::Json && cfg!(not(feature = "json-log")) {
            eprintln!("JSON logging needs the `json-log` feature, using the full format");
        }

        macro_rules! human_layer {
            ($layer:expr) => {
                $layer
                    .with_span_events(span_events.clone())
                    .with_target(true)
                    .with_thread_ids(self.thread_ids)
                    .with_file(self.file_location)
                    .with_line_number(self.file_location)
            };
        }

        macro_rules! install {
            ($writer:expr) => {{
                let registry = tracing_subscriber::registry().with(filter);
                match self.format {
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => registry
                        .with(
                            fmt::layer()
                                .json()
                                .with_span_events(span_events.clone())
                                .with_writer($writer),
                        )
                        .try_init(),
                    LogFormat::Compact => registry
                        .with(human_layer!(fmt::layer().compact().with_writer($writer)))
                        .try_init(),
                    LogFormat::Pretty => registry
                        .with(human_layer!(fmt::layer().pretty().with_writer($writer)))
                        .try_init(),
                    _ => registry
                        .with(human_layer!(fmt::layer().with_writer($writer)))
                        .try_init(),
                }
            }};
        }

        match self.output {
            LogOutput::Stdout => install!(std::io::stdout),
            LogOutput::Stderr => install!(std::io::stderr),
            LogOutput::File => match self.file_path.as_deref() {
                Some(path) => {
                    let appender = tracing_appender::rolling::never(
                        path.parent().unwrap_or_else(|| Path::new(".")),
                        path.file_name()
                            .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE)),
                    );
                    install!(appender)
                }
                None => {
                    eprintln!("File logging requested without a file path, using stdout");
                    install!(std::io::stdout)
                }
            },
        }
    }
}
