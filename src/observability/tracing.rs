use anyhow::{Context, Error, Result};
use once_cell::sync::OnceCell;
use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracer, SdkTracerProvider},
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// OTLPエクスポーターの設定。
#[derive(Debug, Clone, PartialEq)]
pub struct OtelSettings {
    pub endpoint: String,
    pub sampling_ratio: f64,
}

/// Tracing サブスクライバを一度だけ初期化する。
///
/// `otel` が与えられた場合はOTLPエクスポーター経由でスパンを送信する。
/// エクスポーターの構築に失敗した場合はJSONログのみで続行する。
///
/// # Errors
/// サブスクライバの初期化に失敗した場合はエラーを返す。
pub fn init(otel: Option<&OtelSettings>) -> Result<()> {
    TRACING_INIT.get_or_try_init(|| {
        let (tracer, export_error) = match otel.map(init_tracer).transpose() {
            Ok(tracer) => (tracer, None),
            Err(error) => (None, Some(error)),
        };
        let otel_enabled = tracer.is_some();

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).json())
            .with(tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer)))
            .try_init()
            .map_err(|e| Error::msg(e.to_string()))?;

        match (otel, export_error) {
            (Some(settings), None) => info!(
                otel_enabled,
                endpoint = %settings.endpoint,
                sampling_ratio = settings.sampling_ratio,
                "tracing initialized"
            ),
            (_, Some(error)) => warn!(
                otel_enabled,
                error = %error,
                "OTLP exporter unavailable, logging only"
            ),
            (None, None) => info!(otel_enabled, "tracing initialized"),
        }
        Ok::<(), Error>(())
    })?;
    Ok(())
}

fn init_tracer(settings: &OtelSettings) -> Result<SdkTracer> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(settings.endpoint.clone())
        .build()
        .context("failed to build OTLP span exporter")?;

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::TraceIdRatioBased(settings.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .build();

    let tracer = provider.tracer(env!("CARGO_PKG_NAME"));
    global::set_tracer_provider(provider);

    Ok(tracer)
}
