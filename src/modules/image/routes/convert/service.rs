use super::types::{request, response};
use crate::{
    modules::image::service::{self as converter, TargetFormat, UploadRequest},
    types::Context,
};
use bytes::Bytes;
use std::{io::Read, sync::Arc};
use tempfile::NamedTempFile;
use validator::Validate;

async fn read_upload(mut file: NamedTempFile) -> Result<Vec<u8>, response::Error> {
    tokio::task::spawn_blocking(move || {
        let mut buf: Vec<u8> = vec![];
        file.read_to_end(&mut buf).map(|_| buf)
    })
    .await
    .map_err(|err| {
        tracing::error!("Failed to join the upload reader {err:?}");
        response::Error::FailedToConvertImage
    })?
    .map_err(|err| {
        tracing::error!("Failed to read the uploaded file {err:?}");
        response::Error::FailedToConvertImage
    })
}

pub async fn service(ctx: Arc<Context>, body: request::Body) -> response::Response {
    body.validate()
        .map_err(response::Error::FailedToValidate)?;

    let format = body
        .format
        .parse::<TargetFormat>()
        .map_err(|_| response::Error::UnsupportedFormat)?;

    let buf = read_upload(body.file.contents).await?;

    if buf.is_empty() {
        tracing::warn!("Rejected empty upload");
        return Err(response::Error::EmptyFile);
    }

    tracing::debug!(
        file_name = ?body.file.metadata.file_name,
        content_type = ?body.file.metadata.content_type,
        size = buf.len(),
        %format,
        "Converting image"
    );

    let request = UploadRequest {
        bytes: Bytes::from(buf),
        file_name: body.file.metadata.file_name,
        content_type: body.file.metadata.content_type,
        format,
    };

    match ctx.converter.convert(request).await {
        Ok(bytes) => Ok(response::Success::Converted(bytes)),
        Err(converter::Error::Io(err)) => {
            tracing::error!("Failed to convert image: {:?}", err);
            Err(response::Error::FailedToConvertImage)
        }
        Err(converter::Error::InvalidImage) => Err(response::Error::InvalidImage),
        Err(converter::Error::UnsupportedFormat(format)) => {
            tracing::warn!("Converter does not support format {}", format);
            Err(response::Error::UnsupportedFormat)
        }
    }
}
