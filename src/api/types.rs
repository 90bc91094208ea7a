use serde::{Deserialize, Serialize};

use crate::render::OutputFormat;

#[derive(Deserialize)]
pub struct ApiKeyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Serialize)]
pub struct KeyStatus {
    pub status: &'static str,
}

#[derive(Deserialize)]
pub struct GenerateCodeRequest {
    pub prompt: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Deserialize)]
pub struct AnimationRequest {
    pub code: String,
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_quality() -> String {
    "medium".to_string()
}

#[derive(Serialize)]
pub struct AnimationResponse {
    pub output_path: String,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCodeRequest {
    pub code: String,
    pub properties: serde_json::Value,
    #[serde(default)]
    pub history: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct UpdatedCode {
    pub code: String,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_request_defaults_quality_and_format() {
        let req: AnimationRequest =
            serde_json::from_str(r#"{"code":"pass"}"#).expect("deserialize");
        assert_eq!(req.quality, "medium");
        assert_eq!(req.format, OutputFormat::Mp4);
    }

    #[test]
    fn animation_response_omits_absent_error() {
        let value = serde_json::to_value(AnimationResponse {
            output_path: "outputs/animation.mp4".to_string(),
            duration: 2.0,
            error: None,
        })
        .expect("serialize");
        assert!(value.get("error").is_none());
        assert_eq!(value["output_path"], "outputs/animation.mp4");
    }

    #[test]
    fn update_request_history_is_optional() {
        let req: UpdateCodeRequest =
            serde_json::from_str(r#"{"code":"pass","properties":{"font_size":{"value":72}}}"#)
                .expect("deserialize");
        assert!(req.history.is_none());
    }
}
