//! Conversion capability consumed by the image routes.
//!
//! The endpoint only ever talks to [`ConversionService`]; which backend sits
//! behind it is decided once, when the context is built.

mod local;
mod remote;

pub use local::LocalConverter;
pub use remote::RemoteConverter;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::{fmt, io, str::FromStr};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Png,
    Svg,
}

impl TargetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(Error::UnsupportedFormat(raw.to_string())),
        }
    }
}

/// A single upload, alive for one request only.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub format: TargetFormat,
}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    InvalidImage,
    UnsupportedFormat(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[async_trait]
pub trait ConversionService: Send + Sync {
    async fn convert(&self, request: UploadRequest) -> Result<Bytes>;
}
