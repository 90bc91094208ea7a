mod api;
mod config;
mod extract;
mod generate;
mod llm;
mod render;

use config::AppConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!(
        model = %config.model,
        renderer = %config.renderer_program,
        outputs = %config.output_dir.display(),
        "starting sceneforge"
    );
    if config.api_key.is_none() {
        tracing::warn!("no default API key configured; requests must supply their own");
    }

    api::serve(config).await;
}
