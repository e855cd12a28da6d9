use axum::http::{header, HeaderMap, HeaderValue};

/// Choose the `Access-Control-Allow-Origin` value for a request.
///
/// With no allow-list the request origin is reflected (or `*` without one).
/// With an allow-list, unlisted origins get the first listed entry so the
/// browser blocks them.
pub fn pick_origin(request_origin: Option<&str>, allowed: &[String]) -> String {
    let origin = request_origin.unwrap_or_default();

    if allowed.is_empty() {
        return if origin.is_empty() { "*".to_string() } else { origin.to_string() };
    }

    if !origin.is_empty() && allowed.iter().any(|a| a == origin) {
        return origin.to_string();
    }
    allowed.first().cloned().unwrap_or_else(|| "null".to_string())
}

/// Origin header of an incoming request, if readable
pub fn request_origin(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ORIGIN).and_then(|v| v.to_str().ok())
}

pub fn apply_headers(headers: &mut HeaderMap, origin: &str) {
    let origin = HeaderValue::from_str(origin).unwrap_or_else(|_| HeaderValue::from_static("null"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST,OPTIONS"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
}
