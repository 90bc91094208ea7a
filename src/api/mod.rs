mod cors;
mod error;
mod router;
mod routes;
mod types;

use std::path::PathBuf;

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::config::AppConfig;
use crate::generate;
use crate::llm::LlmClient;
use crate::render::Renderer;

use cors::*;
pub use error::ApiError;
use router::build_router;
use routes::*;
use types::*;

#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub renderer: Renderer,
    pub output_dir: PathBuf,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            llm: LlmClient::new(
                config.llm_base_url.clone(),
                config.model.clone(),
                config.api_key.clone(),
            ),
            renderer: Renderer::new(config.renderer_program.clone(), config.output_dir.clone()),
            output_dir: config.output_dir.clone(),
        }
    }
}

pub async fn serve(config: AppConfig) {
    let state = AppState::from_config(&config);
    let cors = CorsConfig::new(config.allowed_origins.clone());
    let app = build_router(state, cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await.expect("server error");
}
