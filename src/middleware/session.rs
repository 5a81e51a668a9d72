use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

/// Request-scoped session token, attached before the poll handlers run.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Pulls the caller's session token from the `x-session-id` header or the
/// `session_id` cookie. A request carrying neither gets a throwaway token,
/// so its identity will not survive past this request.
pub async fn session_context(cookie_jar: CookieJar, mut req: Request, next: Next) -> Response {
    let token = resolve_session_token(req.headers(), &cookie_jar)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

    req.extensions_mut().insert(SessionToken(token));

    next.run(req).await
}

fn resolve_session_token(headers: &HeaderMap, cookie_jar: &CookieJar) -> Option<String> {
    if let Some(header) = headers.get("x-session-id").and_then(|value| value.to_str().ok()) {
        if !header.is_empty() {
            return Some(header.to_string());
        }
    }

    cookie_jar
        .get("session_id")
        .map(|cookie| cookie.value().to_string())
}
