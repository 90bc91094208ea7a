use super::*;

use serde::Serialize;

use crate::generate::GenerationError;
use crate::render::RenderError;

/// Boundary error: every orchestrator failure is translated into a status
/// code plus a human-readable detail string.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Failed to extract code from response")]
    Extraction,
    #[error("Failed to generate code: {0}")]
    Generation(String),
    #[error("Failed to update code: {0}")]
    Update(String),
    #[error("Animation generation failed: {0}")]
    Render(String),
    #[error("File not found")]
    NotFound,
}

impl ApiError {
    pub(super) fn from_generation(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCodeBlock => ApiError::Extraction,
            GenerationError::Llm(e) => ApiError::Generation(e.to_string()),
        }
    }

    pub(super) fn from_update(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCodeBlock => ApiError::Extraction,
            GenerationError::Llm(e) => ApiError::Update(e.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::Render(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_the_error_kind() {
        assert_eq!(
            ApiError::InvalidApiKey.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Extraction.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Render("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn renderer_diagnostic_text_is_carried_through() {
        let err = ApiError::from(RenderError::Renderer("Traceback: boom\n".to_string()));
        assert_eq!(err.to_string(), "Animation generation failed: Traceback: boom\n");
    }

    #[test]
    fn missing_code_block_maps_to_the_fixed_extraction_message() {
        let err = ApiError::from_generation(GenerationError::MissingCodeBlock);
        assert_eq!(err.to_string(), "Failed to extract code from response");
    }
}
