use crate::modules::image::service::{ConversionService, LocalConverter, RemoteConverter};
use async_trait::async_trait;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum AppEnvironment {
    Production,
    Development,
}

impl AppEnvironment {
    pub fn from(raw_environment: String) -> Self {
        match raw_environment.as_ref() {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u16,
    pub url: String,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub converter: Arc<dyn ConversionService>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u16,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConverterBackend {
    Local,
    Remote {
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    },
}

#[derive(Clone, Debug)]
pub struct ConverterConfig {
    pub backend: ConverterBackend,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub converter: ConverterConfig,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    MissingVariable(&'static str),
    InvalidVariable(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVariable(key) => write!(f, "{} not set", key),
            Self::InvalidVariable(key, value) => write!(f, "invalid {}: {}", key, value),
        }
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let environment = var("APP_ENV").unwrap_or_else(|| "development".to_string());
        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVariable("PORT", raw))?,
            None => 8000,
        };
        let url = var("URL").unwrap_or_else(|| format!("http://{}:{}", host, port));

        let backend = match var("CONVERTER_BACKEND").as_deref() {
            None | Some("local") => ConverterBackend::Local,
            Some("remote") => {
                let endpoint =
                    var("CONVERTER_ENDPOINT").ok_or(ConfigError::MissingVariable("CONVERTER_ENDPOINT"))?;
                let timeout = match var("CONVERTER_TIMEOUT_SECS") {
                    Some(raw) => raw
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidVariable("CONVERTER_TIMEOUT_SECS", raw))?,
                    None => DEFAULT_TIMEOUT_SECS,
                };

                ConverterBackend::Remote {
                    endpoint,
                    api_key: var("CONVERTER_API_KEY").filter(|key| !key.is_empty()),
                    timeout: Duration::from_secs(timeout),
                }
            }
            Some(other) => {
                return Err(ConfigError::InvalidVariable(
                    "CONVERTER_BACKEND",
                    other.to_string(),
                ))
            }
        };

        Ok(Self {
            app: AppConfig {
                host,
                environment: AppEnvironment::from(environment),
                port,
                url,
            },
            converter: ConverterConfig { backend },
        })
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Result<Context, ConfigError>;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Result<Context, ConfigError> {
        let converter: Arc<dyn ConversionService> = match self.converter.backend {
            ConverterBackend::Local => Arc::new(LocalConverter::new()),
            ConverterBackend::Remote {
                endpoint,
                api_key,
                timeout,
            } => {
                let remote = RemoteConverter::new(endpoint, api_key, timeout).map_err(|err| {
                    tracing::error!("Failed to build the remote converter client: {:?}", err);
                    ConfigError::InvalidVariable("CONVERTER_ENDPOINT", err.to_string())
                })?;
                Arc::new(remote)
            }
        };

        Ok(Context {
            app: AppContext {
                host: self.app.host,
                environment: self.app.environment,
                port: self.app.port,
                url: self.app.url,
            },
            converter,
        })
    }
}

#[cfg(test)]
impl Context {
    pub fn with_converter<C>(converter: C) -> Arc<Self>
    where
        C: ConversionService + 'static,
    {
        Arc::new(Self {
            app: AppContext {
                host: "127.0.0.1".to_string(),
                environment: AppEnvironment::Development,
                port: 0,
                url: "http://127.0.0.1".to_string(),
            },
            converter: Arc::new(converter),
        })
    }
}
