use super::{ConversionService, Error, Result, UploadRequest};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{
    header::AUTHORIZATION,
    multipart::{Form, Part},
    Client, Response, StatusCode,
};
use std::{io, time::Duration};
use ulid::Ulid;

// Upper bound on a converted image read back from the remote service.
const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

/// Forwards uploads to an external conversion / background removal service.
#[derive(Debug, Clone)]
pub struct RemoteConverter {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    max_response_bytes: usize,
}

impl RemoteConverter {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            max_response_bytes: MAX_RESPONSE_BYTES,
        })
    }

    pub fn with_max_response_bytes(mut self, max_response_bytes: usize) -> Self {
        self.max_response_bytes = max_response_bytes;
        self
    }

    async fn read_body(&self, mut res: Response) -> Result<Bytes> {
        if let Some(length) = res.content_length() {
            if length > self.max_response_bytes as u64 {
                tracing::error!(
                    "Converted image of {} bytes exceeds the {} byte limit",
                    length,
                    self.max_response_bytes
                );
                return Err(io_error("converted image exceeds the response limit"));
            }
        }

        let mut buf = BytesMut::new();

        while let Some(chunk) = res.chunk().await.map_err(|err| {
            tracing::error!("Error occurred while reading converted image: {:?}", err);
            io_error(err)
        })? {
            if buf.len() + chunk.len() > self.max_response_bytes {
                tracing::error!(
                    "Converted image exceeds the {} byte limit",
                    self.max_response_bytes
                );
                return Err(io_error("converted image exceeds the response limit"));
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(buf.freeze())
    }

    fn form(request: UploadRequest) -> Form {
        let file_name = request
            .file_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| Ulid::new().to_string());
        let length = request.bytes.len() as u64;
        let file = || {
            Part::stream_with_length(request.bytes.clone(), length).file_name(file_name.clone())
        };

        let part = match request.content_type.as_deref() {
            Some(content_type) => file().mime_str(content_type).unwrap_or_else(|err| {
                tracing::warn!("Ignoring invalid content type {}: {:?}", content_type, err);
                file()
            }),
            None => file(),
        };

        Form::new()
            .text("format", request.format.as_str())
            .part("file", part)
    }
}

fn io_error<E>(err: E) -> Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Error::Io(io::Error::other(err))
}

#[async_trait]
impl ConversionService for RemoteConverter {
    async fn convert(&self, request: UploadRequest) -> Result<Bytes> {
        let format = request.format;
        let mut req = self.client.post(&self.endpoint).multipart(Self::form(request));

        if let Some(api_key) = &self.api_key {
            req = req.header(AUTHORIZATION, format!("Bearer {}", api_key));
        }

        let res = req.send().await.map_err(|err| {
            tracing::error!("Error occurred while calling the conversion service: {:?}", err);
            io_error(err)
        })?;

        match res.status() {
            StatusCode::OK => self.read_body(res).await,
            StatusCode::BAD_REQUEST | StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::UNPROCESSABLE_ENTITY => {
                let data = res.text().await.unwrap_or_default();
                tracing::warn!("Conversion service rejected the upload as {}: {}", format, data);
                Err(Error::InvalidImage)
            }
            status => {
                let data = res.text().await.unwrap_or_default();
                tracing::error!("Conversion service responded with {}: {}", status, data);
                Err(io_error(format!("conversion service responded with {}", status)))
            }
        }
    }
}
