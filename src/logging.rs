use color_eyre::Result;
use color_eyre::eyre::Context;
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const SERVICE_NAME: &str = "playlist-mirror";

/// Parse a filter directive such as `warn` or `playlist_mirror=debug,reqwest=info`.
fn log_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .wrap_err_with(|| format!("Invalid log filter '{directives}'"))
}

/// Batch span exporter speaking OTLP over gRPC.
fn otlp_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .wrap_err_with(|| format!("Failed to create OTLP exporter for {endpoint}"))?;

    let resource = Resource::builder()
        .with_attributes([KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            service_name.to_string(),
        )])
        .build();

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Route `tracing` events to stderr, filtered by `directives`.
///
/// With an `otlp_endpoint` spans are exported as well, and the provider is handed back so
/// `main` can flush it on exit.
pub fn init_tracing(
    service_name: &str,
    otlp_endpoint: Option<&str>,
    directives: &str,
) -> Result<Option<SdkTracerProvider>> {
    let filter = log_filter(directives)?;
    let provider = otlp_endpoint
        .map(|endpoint| otlp_provider(service_name, endpoint))
        .transpose()?;

    let otel_layer = provider.as_ref().map(|provider| {
        opentelemetry::global::set_tracer_provider(provider.clone());
        tracing_opentelemetry::layer().with_tracer(provider.tracer(service_name.to_string()))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr),
        )
        .with(otel_layer)
        .init();

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_accepts_directives() {
        assert!(log_filter("warn").is_ok());
        assert!(log_filter("playlist_mirror=debug,reqwest=info").is_ok());
    }

    #[test]
    fn test_log_filter_rejects_bad_level() {
        let error = log_filter("playlist_mirror=loud").unwrap_err();
        assert!(error.to_string().contains("Invalid log filter"));
    }
}
