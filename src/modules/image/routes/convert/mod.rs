pub(super) mod handler;
mod router;
mod service;
mod types;

pub use router::get_router;

#[cfg(test)]
mod test {
    use crate::{
        app,
        modules::image::service::{
            ConversionService, Error, LocalConverter, Result, UploadRequest,
        },
        types::Context,
    };
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::{
        multipart::{MultipartForm, Part},
        TestServer,
    };
    use bytes::Bytes;
    use futures::future::join_all;
    use serde_json::Value;
    use std::io;

    const CONVERT: &str = "/api/image/convert";

    struct Fixed(Bytes);

    #[async_trait]
    impl ConversionService for Fixed {
        async fn convert(&self, _: UploadRequest) -> Result<Bytes> {
            Ok(self.0.clone())
        }
    }

    struct Failing(fn() -> Error);

    #[async_trait]
    impl ConversionService for Failing {
        async fn convert(&self, _: UploadRequest) -> Result<Bytes> {
            Err((self.0)())
        }
    }

    /// Answers with `<format>:<file name>:<payload>` so responses can be
    /// traced back to the request that produced them.
    struct Echo;

    #[async_trait]
    impl ConversionService for Echo {
        async fn convert(&self, request: UploadRequest) -> Result<Bytes> {
            tokio::task::yield_now().await;

            let mut out = format!(
                "{}:{}:",
                request.format,
                request.file_name.unwrap_or_default()
            )
            .into_bytes();
            out.extend_from_slice(&request.bytes);
            Ok(Bytes::from(out))
        }
    }

    fn server<C>(converter: C) -> TestServer
    where
        C: ConversionService + 'static,
    {
        TestServer::new(app::router(Context::with_converter(converter))).unwrap()
    }

    fn form(payload: impl Into<Bytes>, format: &str) -> MultipartForm {
        MultipartForm::new().add_text("format", format).add_part(
            "file",
            Part::bytes(payload.into())
                .file_name("upload.jpg")
                .mime_type("image/jpeg"),
        )
    }

    fn dummy_jpeg() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']
    }

    #[tokio::test]
    async fn should_return_converted_bytes() {
        let converted = Bytes::from((0u8..20).collect::<Vec<u8>>());
        let server = server(Fixed(converted.clone()));

        let response = server.post(CONVERT).multipart(form(dummy_jpeg(), "png")).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "application/octet-stream");
        assert_eq!(response.as_bytes().len(), 20);
        assert_eq!(response.as_bytes(), &converted);
    }

    #[tokio::test]
    async fn should_pass_upload_through_to_converter() {
        let server = server(Echo);

        let response = server.post(CONVERT).multipart(form(dummy_jpeg(), " SVG ")).await;

        response.assert_status_ok();
        let mut expected = b"svg:upload.jpg:".to_vec();
        expected.extend(dummy_jpeg());
        assert_eq!(&response.as_bytes()[..], &expected[..]);
    }

    #[tokio::test]
    async fn should_return_empty_500_on_io_failure() {
        let server = server(Failing(|| Error::Io(io::Error::other("disk full"))));

        let response = server.post(CONVERT).multipart(form(dummy_jpeg(), "png")).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.as_bytes().is_empty());
    }

    #[tokio::test]
    async fn should_return_400_when_converter_rejects_input() {
        let server = server(Failing(|| Error::InvalidImage));

        let response = server.post(CONVERT).multipart(form(dummy_jpeg(), "png")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Invalid input data");
    }

    #[tokio::test]
    async fn should_return_400_when_converter_lacks_format() {
        let server = server(Failing(|| Error::UnsupportedFormat("svg".to_string())));

        let response = server.post(CONVERT).multipart(form(dummy_jpeg(), "svg")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Unsupported target format");
    }

    #[tokio::test]
    async fn should_reject_unsupported_format() {
        let server = server(Echo);

        let response = server.post(CONVERT).multipart(form(dummy_jpeg(), "gif")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["errors"]["format"][0]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn should_reject_empty_format() {
        let server = server(Echo);

        let response = server.post(CONVERT).multipart(form(dummy_jpeg(), "")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let codes: Vec<Value> = response.json::<Value>()["errors"]["format"]
            .as_array()
            .unwrap()
            .iter()
            .map(|error| error["code"].clone())
            .collect();
        assert!(codes.contains(&Value::from("MISSING_FORMAT")));
    }

    #[tokio::test]
    async fn should_reject_empty_file() {
        let server = server(Echo);

        let response = server.post(CONVERT).multipart(form(Vec::<u8>::new(), "png")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Uploaded file is empty");
    }

    #[tokio::test]
    async fn should_reject_missing_format_part() {
        let server = server(Echo);
        let form = MultipartForm::new().add_part("file", Part::bytes(dummy_jpeg()).file_name("a.jpg"));

        let response = server.post(CONVERT).multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_reject_oversized_file() {
        let server = server(Echo);

        let response = server
            .post(CONVERT)
            .multipart(form(vec![0u8; 10 * 1024 * 1024 + 1], "png"))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn should_not_mix_up_concurrent_requests() {
        let server = server(Echo);

        let responses = join_all((0..100).map(|i| {
            let server = &server;
            async move {
                let payload = format!("payload-{i}").into_bytes();
                let response = server
                    .post(CONVERT)
                    .multipart(form(payload.clone(), "png"))
                    .await;
                (payload, response)
            }
        }))
        .await;

        for (payload, response) in responses {
            response.assert_status_ok();
            let mut expected = b"png:upload.jpg:".to_vec();
            expected.extend(payload);
            assert_eq!(&response.as_bytes()[..], &expected[..]);
        }
    }

    #[tokio::test]
    async fn should_convert_with_local_converter() {
        use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
        use std::io::Cursor;

        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 4, Rgba([0, 120, 255, 255])));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();
        let server = server(LocalConverter::new());

        let response = server.post(CONVERT).multipart(form(png, "svg")).await;

        response.assert_status_ok();
        let svg = String::from_utf8(response.as_bytes().to_vec()).unwrap();
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"width="6" height="4""#));
    }
}
