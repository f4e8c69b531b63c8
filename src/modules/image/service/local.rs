use super::{ConversionService, Error, Result, TargetFormat, UploadRequest};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageError, ImageFormat, ImageReader};
use std::io::{self, Cursor};

/// In-process transcoder. Decodes JPEG, PNG, WebP or GIF input and
/// re-encodes it as PNG, or as an SVG document embedding that PNG.
///
/// Background removal is not done here; point `CONVERTER_BACKEND` at a
/// remote service for that.
#[derive(Debug, Default, Clone)]
pub struct LocalConverter;

impl LocalConverter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConversionService for LocalConverter {
    async fn convert(&self, request: UploadRequest) -> Result<Bytes> {
        let UploadRequest { bytes, format, .. } = request;

        tokio::task::spawn_blocking(move || transcode(&bytes, format))
            .await
            .map_err(|err| {
                tracing::error!("Conversion worker failed: {:?}", err);
                Error::Io(io::Error::other(err))
            })?
    }
}

fn transcode(data: &[u8], format: TargetFormat) -> Result<Bytes> {
    let img = decode(data)?;

    match format {
        TargetFormat::Png => encode_png(&img).map(Bytes::from),
        TargetFormat::Svg => {
            let png = encode_png(&img)?;
            Ok(Bytes::from(wrap_in_svg(&img, &png)))
        }
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()
        .map_err(|err| match err {
            ImageError::IoError(err) => Error::Io(err),
            err => {
                tracing::warn!("Failed to decode uploaded image: {}", err);
                Error::InvalidImage
            }
        })
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut buf = Vec::with_capacity(width as usize * height as usize);

    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|err| match err {
            ImageError::IoError(err) => Error::Io(err),
            err => Error::Io(io::Error::other(err)),
        })?;

    Ok(buf)
}

fn wrap_in_svg(img: &DynamicImage, png: &[u8]) -> String {
    let (width, height) = img.dimensions();

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" "#,
            r#"width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<image width="{w}" height="{h}" href="data:image/png;base64,{data}" "#,
            r#"xlink:href="data:image/png;base64,{data}"/></svg>"#
        ),
        w = width,
        h = height,
        data = BASE64_STANDARD.encode(png),
    )
}
