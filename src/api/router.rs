use super::*;

pub(super) fn build_router(state: AppState, cors: CorsConfig) -> Router {
    Router::new()
        .route("/api/validate-key", post(validate_key))
        .route("/api/generate-code", post(generate_code))
        .route("/api/generate-animation", post(generate_animation))
        .route("/api/update-code", post(update_code))
        .route("/outputs/{filename}", get(get_output_file))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(middleware::from_fn_with_state(cors, cors_layer))
}
