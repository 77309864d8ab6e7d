use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pixel_codec::CodecError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Input too large: {size} characters (max {max})")]
    InputTooLarge { size: usize, max: usize },

    #[error("Image not found")]
    ImageNotFound,

    #[error("{0}")]
    Codec(#[from] CodecError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("PNG decode error: {0}")]
    PngDecode(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Image too large: {width}x{height} (max {max} pixels)")]
    TooLarge { width: u32, height: u32, max: u64 },

    #[error("Image has no pixels")]
    Empty,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InputTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ImageNotFound => StatusCode::NOT_FOUND,
            ApiError::Codec(e) => match e {
                CodecError::EmptyInput
                | CodecError::InvalidKeyFormat(_)
                | CodecError::MissingRequiredCommand(_) => StatusCode::BAD_REQUEST,
                CodecError::NonInvertibleTransform | CodecError::DataDesynchronized(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                CodecError::InvalidOptions(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Image(ImageError::PngEncode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Image(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = Json(json!({
            "success": false,
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_codec::RequiredCommand;

    #[test]
    fn test_api_error_missing_field() {
        let error = ApiError::MissingField("key");
        assert_eq!(error.to_string(), "Missing required field: key");
    }

    #[test]
    fn test_api_error_input_too_large() {
        let error = ApiError::InputTooLarge { size: 12, max: 10 };
        assert_eq!(
            error.to_string(),
            "Input too large: 12 characters (max 10)"
        );
    }

    #[test]
    fn test_api_error_codec_passes_message_through() {
        let error = ApiError::from(CodecError::MissingRequiredCommand(
            RequiredCommand::DummyPadding,
        ));
        assert_eq!(
            error.to_string(),
            "invalid key: missing 'd' (dummy pixels) command"
        );
    }

    #[test]
    fn test_image_error_too_large() {
        let error = ImageError::TooLarge {
            width: 5000,
            height: 5000,
            max: 16_000_000,
        };
        assert_eq!(
            error.to_string(),
            "Image too large: 5000x5000 (max 16000000 pixels)"
        );
    }

    #[test]
    fn test_api_error_from_image_error() {
        let api_error: ApiError = ImageError::Empty.into();
        match api_error {
            ApiError::Image(ImageError::Empty) => {}
            _ => panic!("Expected Image variant"),
        }
    }

    #[test]
    fn test_api_error_into_response_status_codes() {
        // MissingField -> BAD_REQUEST
        let response = ApiError::MissingField("image").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // ImageNotFound -> NOT_FOUND
        let response = ApiError::ImageNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Key problems -> BAD_REQUEST
        let response =
            ApiError::Codec(CodecError::InvalidKeyFormat("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = ApiError::Codec(CodecError::EmptyInput).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Key/image mismatch -> UNPROCESSABLE_ENTITY
        let response = ApiError::Codec(CodecError::NonInvertibleTransform).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let response =
            ApiError::Codec(CodecError::DataDesynchronized("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        // Unusable server options -> INTERNAL_SERVER_ERROR
        let response =
            ApiError::Codec(CodecError::InvalidOptions("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // Bad upload -> BAD_REQUEST, failed encode -> INTERNAL_SERVER_ERROR
        let response = ApiError::Image(ImageError::PngDecode("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = ApiError::Image(ImageError::PngEncode("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // Internal -> INTERNAL_SERVER_ERROR
        let response = ApiError::Internal("error".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // InputTooLarge -> PAYLOAD_TOO_LARGE
        let response = ApiError::InputTooLarge { size: 2, max: 1 }.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
