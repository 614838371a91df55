use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;

use crate::{
    api,
    clients::{CatalogSource, JikanClient},
    config::Config,
    observability::Telemetry,
    pipeline::RecommendationPipeline,
};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    catalog: Arc<dyn CatalogSource>,
    pipeline: RecommendationPipeline,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn catalog(&self) -> Arc<dyn CatalogSource> {
        Arc::clone(&self.registry.catalog)
    }

    pub(crate) fn pipeline(&self) -> &RecommendationPipeline {
        &self.registry.pipeline
    }
}

impl ComponentRegistry {
    /// 構成情報からトレーシング、メトリクス、Jikanクライアント、推薦パイプラインを初期化する。
    ///
    /// # Errors
    /// Telemetry の初期化や HTTP クライアント構築が失敗した場合はエラーを返す。
    pub fn build(config: Config) -> Result<Self> {
        let telemetry = Telemetry::new(config.otel_settings().as_ref())?;
        let jikan = JikanClient::new(config.jikan_config())
            .context("failed to build catalog client")?
            .with_metrics(telemetry.metrics_arc());

        Ok(Self::assemble(config, telemetry, Arc::new(jikan)))
    }

    /// 任意のカタログ実装で組み立てる。トレーシングは初期化しない。
    ///
    /// # Errors
    /// メトリクスの登録に失敗した場合はエラーを返す。
    pub fn with_catalog(config: Config, catalog: Arc<dyn CatalogSource>) -> Result<Self> {
        let telemetry = Telemetry::metrics_only()?;
        Ok(Self::assemble(config, telemetry, catalog))
    }

    fn assemble(config: Config, telemetry: Telemetry, catalog: Arc<dyn CatalogSource>) -> Self {
        let pipeline = RecommendationPipeline::builder(Arc::clone(&catalog))
            .with_source_timeout(config.catalog_source_timeout())
            .with_metrics(telemetry.metrics_arc())
            .build();

        Self {
            config: Arc::new(config),
            telemetry,
            catalog,
            pipeline,
        }
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn pipeline(&self) -> &RecommendationPipeline {
        &self.pipeline
    }
}

pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;

    #[test]
    fn component_registry_builds_with_custom_catalog() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        // SAFETY: test code adjusts deterministic environment state sequentially.
        unsafe {
            std::env::set_var("CATALOG_SOURCE_TIMEOUT_MS", "750");
        }
        let config = Config::from_env().expect("config loads");
        // SAFETY: see above.
        unsafe {
            std::env::remove_var("CATALOG_SOURCE_TIMEOUT_MS");
        }

        let catalog = Arc::new(crate::pipeline::test_support::StubCatalog::default());
        let registry = ComponentRegistry::with_catalog(config, catalog).expect("registry builds");

        assert_eq!(
            registry.config().catalog_source_timeout(),
            std::time::Duration::from_millis(750)
        );
    }

    #[test]
    fn component_registry_builds_jikan_client_from_defaults() {
        let registry = ComponentRegistry::build(Config::default()).expect("registry builds");
        assert_eq!(
            registry.config().catalog_base_url(),
            "https://api.jikan.moe/v4/"
        );
    }
}
