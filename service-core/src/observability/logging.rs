use crate::config::{Config, LogFormat};
use chrono::Local;
use opentelemetry::trace::TraceError;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use std::fmt;
use std::path::Path;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Renders events as `<timestamp> [<LEVEL>] <file>:<line> - <message>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceLocationFormat;

impl<S, N> FormatEvent<S, N> for SourceLocationFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let file = metadata
            .file()
            .and_then(|f| Path::new(f).file_name())
            .and_then(|f| f.to_str())
            .unwrap_or_else(|| metadata.target());

        write!(
            writer,
            "{} [{}] {}:{} - ",
            Local::now().format(TIMESTAMP_FORMAT),
            metadata.level(),
            file,
            metadata.line().unwrap_or(0)
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn otlp_tracer(service_name: &str, otlp_endpoint: &str) -> Result<sdktrace::Tracer, TraceError> {
    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(otlp_endpoint);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", service_name.to_string()),
        ])))
        .install_batch(runtime::Tokio)
}

/// Install the process-wide subscriber.
///
/// `RUST_LOG` wins over `config.log_level`. Events are written synchronously
/// to stdout, so every log call is flushed by the time it returns. Calling
/// this again after a subscriber is installed does nothing.
pub fn init_tracing(service_name: &str, config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let telemetry = config.otlp_endpoint.as_deref().and_then(|endpoint| {
        match otlp_tracer(service_name, endpoint) {
            Ok(tracer) => Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Err(e) => {
                eprintln!(
                    "Failed to initialize OTLP tracer for service '{}' at endpoint '{}': {}",
                    service_name, endpoint, e
                );
                None
            }
        }
    });

    let (text, json) = match config.log_format {
        LogFormat::Text => (
            Some(tracing_subscriber::fmt::layer().event_format(SourceLocationFormat)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .flatten_event(true),
            ),
        ),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(telemetry)
        .with(text)
        .with(json)
        .try_init();

    if installed.is_ok() {
        tracing::debug!(service = service_name, format = ?config.log_format, "Logging initialized");
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::capture;
    use super::*;

    #[test]
    fn line_carries_level_location_and_message() {
        let (_, output) = capture(|| tracing::error!("Validation Error: app:boom"));

        assert!(output.contains(" [ERROR] logging.rs:"), "got: {output}");
        assert!(output.trim_end().ends_with(" - Validation Error: app:boom"), "got: {output}");
    }

    #[test]
    fn line_starts_with_timestamp() {
        let (_, output) = capture(|| tracing::debug!("hello"));

        let timestamp = output.split(" [").next().unwrap();
        assert!(
            chrono::NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok(),
            "unparseable timestamp: {timestamp}"
        );
    }

    #[test]
    fn one_line_per_event() {
        let (_, output) = capture(|| {
            tracing::info!("first");
            tracing::warn!("second");
        });

        assert_eq!(output.lines().count(), 2);
    }
}
