use super::*;

pub(super) async fn validate_key(
    State(state): State<AppState>,
    Json(req): Json<ApiKeyRequest>,
) -> Result<Json<KeyStatus>, ApiError> {
    state
        .llm
        .validate_key(req.api_key.as_deref())
        .await
        .map_err(|err| {
            tracing::warn!("key validation failed: {err}");
            ApiError::InvalidApiKey
        })?;
    Ok(Json(KeyStatus { status: "valid" }))
}

pub(super) async fn generate_code(
    State(state): State<AppState>,
    Json(req): Json<GenerateCodeRequest>,
) -> Result<Json<generate::GenerationResult>, ApiError> {
    let result = generate::generate_code(&state.llm, &req.prompt, req.api_key.as_deref())
        .await
        .map_err(|err| {
            tracing::warn!("code generation failed: {err}");
            ApiError::from_generation(err)
        })?;
    tracing::info!(
        code_bytes = result.code.len(),
        metadata_blocks = result.metadata.len(),
        "generated scene code"
    );
    Ok(Json(result))
}

pub(super) async fn generate_animation(
    State(state): State<AppState>,
    Json(req): Json<AnimationRequest>,
) -> Result<Json<AnimationResponse>, ApiError> {
    let renderer = state.renderer.clone();
    let outcome =
        tokio::task::spawn_blocking(move || renderer.render(&req.code, &req.quality, req.format))
            .await
            .map_err(|e| ApiError::Render(format!("render task failed: {e}")))?
            .map_err(|err| {
                tracing::warn!("render failed: {err}");
                ApiError::from(err)
            })?;

    tracing::info!(path = %outcome.output_path.display(), "rendered animation");
    Ok(Json(AnimationResponse {
        output_path: outcome.output_path.to_string_lossy().into_owned(),
        duration: outcome.duration,
        error: None,
    }))
}

pub(super) async fn update_code(
    State(state): State<AppState>,
    Json(req): Json<UpdateCodeRequest>,
) -> Result<Json<UpdatedCode>, ApiError> {
    let history = req.history.unwrap_or_default();
    let code = generate::update_code(&state.llm, &req.code, &req.properties, &history)
        .await
        .map_err(|err| {
            tracing::warn!("code update failed: {err}");
            ApiError::from_update(err)
        })?;
    Ok(Json(UpdatedCode { code }))
}

pub(super) async fn get_output_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_safe_filename(&filename) {
        return Err(ApiError::NotFound);
    }
    let path = state.output_dir.join(&filename);
    let bytes = tokio::fs::read(&path).await.map_err(|_| ApiError::NotFound)?;
    Ok(([(header::CONTENT_TYPE, media_type(&filename))], bytes))
}

pub(super) async fn health() -> Json<Health> {
    Json(Health { status: "healthy" })
}

/// Served files are addressed by bare name only; anything that could walk
/// out of the outputs directory is treated as absent.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && name != "." && name != ".."
}

fn media_type(filename: &str) -> &'static str {
    match std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some("mp4") => "video/mp4",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
