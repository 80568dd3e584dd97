use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

#[derive(Debug, Clone)]
pub(crate) struct CorsPolicy {
    allow_any: bool,
    origins: Arc<Vec<String>>,
}

impl CorsPolicy {
    pub(crate) fn new(origins: &[String]) -> Self {
        Self {
            allow_any: origins.iter().any(|origin| origin == "*"),
            origins: Arc::new(
                origins
                    .iter()
                    .map(|origin| origin.trim_end_matches('/').to_string())
                    .collect(),
            ),
        }
    }

    /// Value for `Access-Control-Allow-Origin`, or `None` when the origin is not allowed.
    /// Credentials are allowed, so the request origin is echoed instead of `*`.
    pub(crate) fn allowed_origin(&self, origin: &str) -> Option<HeaderValue> {
        let permitted = self.allow_any || self.origins.iter().any(|allowed| allowed == origin);
        if !permitted {
            return None;
        }
        HeaderValue::from_str(origin).ok()
    }
}

pub(crate) async fn apply_cors(
    State(policy): State<CorsPolicy>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let Some(origin) = origin else {
        return next.run(req).await;
    };
    let allowed = policy.allowed_origin(&origin);
    let preflight = req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    if preflight {
        let Some(allowed) = allowed else {
            tracing::warn!(origin = %origin, "cors preflight rejected");
            return StatusCode::FORBIDDEN.into_response();
        };
        let request_headers = req
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned();
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        insert_common(headers, allowed);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        if let Some(request_headers) = request_headers {
            headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, request_headers);
        }
        headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("600"));
        return response;
    }

    let mut response = next.run(req).await;
    if let Some(allowed) = allowed {
        insert_common(response.headers_mut(), allowed);
    }
    response
}

fn insert_common(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
}
