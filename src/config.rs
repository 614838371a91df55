use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

use crate::{
    clients::jikan::{JikanConfig, MAX_PAGE_LIMIT},
    observability::tracing::OtelSettings,
    util::retry::RetryConfig,
};

#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
pub(crate) static ENV_MUTEX: Lazy<std::sync::Mutex<()>> = Lazy::new(|| std::sync::Mutex::new(()));

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    catalog_base_url: String,
    catalog_connect_timeout: Duration,
    catalog_total_timeout: Duration,
    catalog_source_timeout: Duration,
    catalog_page_limit: u32,
    catalog_search_limit: u32,
    http_max_retries: usize,
    http_backoff_base_ms: u64,
    http_backoff_cap_ms: u64,
    otel_exporter_endpoint: Option<String>,
    otel_sampling_ratio: f64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Default for Config {
    /// 環境変数を参照しない既定値。
    fn default() -> Self {
        Self {
            http_bind: SocketAddr::from(([0, 0, 0, 0], 9010)),
            catalog_base_url: JikanConfig::DEFAULT_BASE_URL.to_string(),
            catalog_connect_timeout: Duration::from_millis(3000),
            catalog_total_timeout: Duration::from_millis(10_000),
            catalog_source_timeout: Duration::from_millis(20_000),
            catalog_page_limit: MAX_PAGE_LIMIT,
            catalog_search_limit: 10,
            http_max_retries: 3,
            http_backoff_base_ms: 250,
            http_backoff_cap_ms: 4000,
            otel_exporter_endpoint: None,
            otel_sampling_ratio: 1.0,
        }
    }
}

impl Config {
    /// 環境変数から推薦サービスの設定値を読み込み、検証する。
    ///
    /// すべての値にデフォルトがあるため、必須の環境変数はない。
    ///
    /// # Errors
    /// 数値／アドレスのパースや範囲チェックに失敗した場合は [`ConfigError`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_bind = parse_socket_addr("RECOMMENDER_HTTP_BIND", "0.0.0.0:9010")?;
        let catalog_base_url = env::var("CATALOG_BASE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| JikanConfig::DEFAULT_BASE_URL.to_string());
        let catalog_connect_timeout = parse_duration_ms("CATALOG_CONNECT_TIMEOUT_MS", 3000)?;
        let catalog_total_timeout = parse_duration_ms("CATALOG_TOTAL_TIMEOUT_MS", 10_000)?;
        let catalog_source_timeout = parse_duration_ms("CATALOG_SOURCE_TIMEOUT_MS", 20_000)?;
        let catalog_page_limit = parse_page_limit("CATALOG_PAGE_LIMIT", MAX_PAGE_LIMIT)?;
        let catalog_search_limit = parse_page_limit("CATALOG_SEARCH_LIMIT", 10)?;
        let http_max_retries = parse_usize("HTTP_MAX_RETRIES", 3)?;
        let http_backoff_base_ms = parse_u64("HTTP_BACKOFF_BASE_MS", 250)?;
        let http_backoff_cap_ms = parse_u64("HTTP_BACKOFF_CAP_MS", 4000)?;
        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let otel_sampling_ratio = parse_ratio("OTEL_SAMPLING_RATIO", 1.0)?;

        Ok(Self {
            http_bind,
            catalog_base_url,
            catalog_connect_timeout,
            catalog_total_timeout,
            catalog_source_timeout,
            catalog_page_limit,
            catalog_search_limit,
            http_max_retries,
            http_backoff_base_ms,
            http_backoff_cap_ms,
            otel_exporter_endpoint,
            otel_sampling_ratio,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn catalog_base_url(&self) -> &str {
        &self.catalog_base_url
    }

    #[must_use]
    pub fn catalog_connect_timeout(&self) -> Duration {
        self.catalog_connect_timeout
    }

    #[must_use]
    pub fn catalog_total_timeout(&self) -> Duration {
        self.catalog_total_timeout
    }

    /// 候補ソース1件あたりの待ち時間上限。
    #[must_use]
    pub fn catalog_source_timeout(&self) -> Duration {
        self.catalog_source_timeout
    }

    #[must_use]
    pub fn catalog_page_limit(&self) -> u32 {
        self.catalog_page_limit
    }

    #[must_use]
    pub fn catalog_search_limit(&self) -> u32 {
        self.catalog_search_limit
    }

    #[must_use]
    pub fn http_max_retries(&self) -> usize {
        self.http_max_retries
    }

    #[must_use]
    pub fn http_backoff_base_ms(&self) -> u64 {
        self.http_backoff_base_ms
    }

    #[must_use]
    pub fn http_backoff_cap_ms(&self) -> u64 {
        self.http_backoff_cap_ms
    }

    #[must_use]
    pub fn otel_exporter_endpoint(&self) -> Option<&str> {
        self.otel_exporter_endpoint.as_deref()
    }

    #[must_use]
    pub fn otel_sampling_ratio(&self) -> f64 {
        self.otel_sampling_ratio
    }

    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.http_max_retries.max(1),
            self.http_backoff_base_ms,
            self.http_backoff_cap_ms,
        )
    }

    #[must_use]
    pub fn jikan_config(&self) -> JikanConfig {
        JikanConfig {
            base_url: self.catalog_base_url.clone(),
            connect_timeout: self.catalog_connect_timeout,
            total_timeout: self.catalog_total_timeout,
            page_limit: self.catalog_page_limit,
            search_limit: self.catalog_search_limit,
            retry: self.retry_config(),
        }
    }

    /// OTLPエンドポイントが設定されている場合のみ `Some` を返す。
    #[must_use]
    pub fn otel_settings(&self) -> Option<OtelSettings> {
        self.otel_exporter_endpoint
            .as_ref()
            .map(|endpoint| OtelSettings {
                endpoint: endpoint.clone(),
                sampling_ratio: self.otel_sampling_ratio,
            })
    }
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());

    raw.parse().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_duration_ms(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    let ms = parse_u64(name, default_ms)?;
    Ok(Duration::from_millis(ms))
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_page_limit(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let parsed = raw.parse::<u32>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    if !(1..=MAX_PAGE_LIMIT).contains(&parsed) {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("value must be between 1 and {MAX_PAGE_LIMIT}"),
        });
    }
    Ok(parsed)
}

fn parse_ratio(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let parsed = raw.parse::<f64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("value must be between 0.0 and 1.0"),
        });
    }
    Ok(parsed)
}
