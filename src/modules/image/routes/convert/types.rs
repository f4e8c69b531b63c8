pub mod request {
    use crate::modules::image::service::TargetFormat;
    use axum_typed_multipart::{FieldData, TryFromMultipart};
    use std::borrow::Cow;
    use tempfile::NamedTempFile;
    use utoipa::ToSchema;
    use validator::{Validate, ValidationError};

    fn validate_format(format: &str) -> Result<(), ValidationError> {
        match format.parse::<TargetFormat>() {
            Ok(_) => Ok(()),
            Err(_) => Err(ValidationError::new("UNSUPPORTED_FORMAT")
                .with_message(Cow::from("Format must be one of: png, svg"))),
        }
    }

    #[derive(TryFromMultipart, Validate)]
    pub struct Body {
        #[form_data(limit = "10MiB")]
        pub file: FieldData<NamedTempFile>,
        #[validate(
            length(min = 1, code = "MISSING_FORMAT", message = "Format is required"),
            custom(function = "validate_format")
        )]
        pub format: String,
    }

    /// Documentation shape of [`Body`].
    #[allow(dead_code)]
    #[derive(ToSchema)]
    pub struct Form {
        #[schema(value_type = String, format = Binary)]
        pub file: Vec<u8>,
        pub format: TargetFormat,
    }

}

pub mod response {
    use axum::{
        extract::Json,
        http::{header, StatusCode},
        response::IntoResponse,
    };
    use bytes::Bytes;
    use serde_json::json;
    use utoipa::ToSchema;
    use validator::ValidationErrors;

    use crate::utils::validation;

    /// Documentation shape of [`Success::Converted`].
    #[allow(dead_code)]
    #[derive(ToSchema)]
    #[schema(value_type = String, format = Binary)]
    pub struct ConvertedImage(Vec<u8>);

    pub enum Success {
        Converted(Bytes),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Converted(bytes) => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/octet-stream")],
                    bytes,
                )
                    .into_response(),
            }
        }
    }

    pub enum Error {
        FailedToValidate(ValidationErrors),
        EmptyFile,
        InvalidImage,
        UnsupportedFormat,
        FailedToConvertImage,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::FailedToValidate(errors) => validation::into_response(errors).into_response(),
                Self::EmptyFile => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Uploaded file is empty" })),
                )
                    .into_response(),
                Self::InvalidImage => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid input data" })),
                )
                    .into_response(),
                Self::UnsupportedFormat => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Unsupported target format" })),
                )
                    .into_response(),
                Self::FailedToConvertImage => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
