use super::*;

/// Browser-origin allowlist. A single "*" entry selects the wildcard
/// deployment variant; any other entries are matched exactly.
#[derive(Clone)]
pub(super) struct CorsConfig {
    allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub(super) fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    fn is_wildcard(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    fn allow_origin(&self, origin: &str) -> Option<HeaderValue> {
        if self.is_wildcard() {
            return Some(HeaderValue::from_static("*"));
        }
        if self.allowed_origins.iter().any(|o| o == origin) {
            return HeaderValue::from_str(origin).ok();
        }
        None
    }
}

pub(super) async fn cors_layer(
    State(cors): State<CorsConfig>,
    req: Request,
    next: Next,
) -> Response {
    let allow = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .and_then(|origin| cors.allow_origin(origin));
    let wildcard = cors.is_wildcard();

    // Preflight never reaches the handlers.
    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        if let Some(value) = allow {
            apply_cors_headers(response.headers_mut(), value, wildcard);
        }
        return response;
    }

    let mut response = next.run(req).await;
    if let Some(value) = allow {
        apply_cors_headers(response.headers_mut(), value, wildcard);
    }
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, allow_origin: HeaderValue, wildcard: bool) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type, authorization"),
    );
    // Credentials cannot be combined with a wildcard origin.
    if !wildcard {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::routing::get;
    use tower::util::ServiceExt;

    async fn ok_handler() -> &'static str {
        "ok"
    }

    fn app_with(origins: Vec<&str>) -> Router {
        let cors = CorsConfig::new(origins.into_iter().map(str::to_string).collect());
        Router::new()
            .route("/", get(ok_handler))
            .layer(middleware::from_fn_with_state(cors, cors_layer))
    }

    #[tokio::test]
    async fn allowed_origin_is_echoed_back() {
        let app = app_with(vec!["http://localhost:5173"]);
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn disallowed_origin_gets_no_cors_headers() {
        let app = app_with(vec!["http://localhost:5173"]);
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://evil.example.com")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        // The request itself still succeeds; the browser enforces the block.
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn preflight_short_circuits_with_no_content() {
        let app = app_with(vec!["http://localhost:5173"]);
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .method("OPTIONS")
                    .uri("/")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, POST, OPTIONS"
        );
    }

    #[tokio::test]
    async fn wildcard_variant_allows_any_origin_without_credentials() {
        let app = app_with(vec!["*"]);
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://anywhere.example.com")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        assert!(res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
    }

    #[tokio::test]
    async fn request_without_origin_passes_through_untouched() {
        let app = app_with(vec!["http://localhost:5173"]);
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
