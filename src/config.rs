//! Process configuration, read once at startup. Business logic never touches
//! the environment; everything is injected from here.

use std::path::PathBuf;

use crate::llm;
use crate::render;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Origins the frontend dev servers run on.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:5174"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Default LLM credential, used when a request carries no explicit key.
    pub api_key: Option<String>,
    pub llm_base_url: String,
    pub model: String,
    pub renderer_program: String,
    pub output_dir: PathBuf,
    /// CORS allowlist; the single entry "*" selects the wildcard variant.
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_string("SCENEFORGE_BIND")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            api_key: env_string("OPENAI_API_KEY"),
            llm_base_url: env_string("OPENAI_BASE_URL")
                .unwrap_or_else(|| llm::DEFAULT_BASE_URL.to_string()),
            model: env_string("SCENEFORGE_MODEL").unwrap_or_else(|| llm::DEFAULT_MODEL.to_string()),
            renderer_program: env_string("SCENEFORGE_RENDERER")
                .unwrap_or_else(|| render::DEFAULT_PROGRAM.to_string()),
            output_dir: env_string("SCENEFORGE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(render::DEFAULT_OUTPUT_DIR)),
            allowed_origins: env_string("SCENEFORGE_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_else(|| {
                    DEFAULT_ALLOWED_ORIGINS
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_list_parses_commas_and_ignores_blanks() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://app.example.com ,"),
            vec![
                "http://localhost:5173".to_string(),
                "https://app.example.com".to_string()
            ]
        );
    }

    #[test]
    fn wildcard_is_a_single_origin_entry() {
        assert_eq!(parse_origins("*"), vec!["*".to_string()]);
    }
}
