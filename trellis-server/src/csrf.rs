//! CSRF token middleware and the context processor that exposes the token
//! to templates.
//!
//! Tokens are random alphanumeric strings kept in a cookie. Unsafe requests
//! must echo the cookie value back in a form field or header. The cookie is
//! re-sent on every response so its max-age keeps sliding forward.

use std::fmt;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use minijinja::{HtmlEscape, Value};
use rand::distributions::Alphanumeric;
use rand::Rng;
use subtle::ConstantTimeEq;

use trellis_core::CsrfConfig;
use trellis_renderer::RenderContext;

pub const TOKEN_LENGTH: usize = 32;

/// Upper bound on buffered form bodies for token lookup.
const MAX_FORM_BYTES: usize = 1024 * 1024;

/// The request's CSRF token, stored in request extensions by [`protect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn generate() -> Self {
        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `value` has the shape of a token this module issues.
    pub fn is_well_formed(value: &str) -> bool {
        value.len() == TOKEN_LENGTH && value.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// Constant-time comparison against a submitted value.
    pub fn matches(&self, submitted: &str) -> bool {
        self.0.as_bytes().ct_eq(submitted.as_bytes()).into()
    }
}

impl From<String> for CsrfToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Value of cookie `name`, if present and shaped like an issued token.
pub fn cookie_token(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && CsrfToken::is_well_formed(value))
        .map(|(_, value)| value.to_string())
}

/// Token submitted with an unsafe request: the form field of an urlencoded
/// body first, then the header.
fn submitted_token(headers: &HeaderMap, body: &[u8], config: &CsrfConfig) -> Option<String> {
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    let from_form = is_form
        .then(|| {
            url::form_urlencoded::parse(body)
                .find(|(key, _)| key == config.form_field.as_str())
                .map(|(_, value)| value.into_owned())
        })
        .flatten();

    from_form.or_else(|| {
        headers
            .get(config.header_name.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    })
}

fn set_cookie_value(config: &CsrfConfig, token: &CsrfToken) -> Option<HeaderValue> {
    let cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax; HttpOnly",
        config.cookie_name,
        token,
        config.cookie_max_age().as_secs()
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(cookie = %config.cookie_name, error = %err, "invalid CSRF cookie header");
            None
        }
    }
}

/// axum middleware: attach a [`CsrfToken`] to every request and reject
/// unsafe requests whose submitted token does not match the cookie.
pub async fn protect(State(config): State<Arc<CsrfConfig>>, request: Request, next: Next) -> Response {
    let existing = cookie_token(request.headers(), &config.cookie_name);
    let token = existing
        .clone()
        .map(CsrfToken::from)
        .unwrap_or_else(CsrfToken::generate);

    let mut request = request;
    if !is_safe_method(request.method()) {
        let (parts, body) = request.into_parts();
        let bytes = match to_bytes(body, MAX_FORM_BYTES).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(uri = %parts.uri, error = %err, "could not read request body");
                return (StatusCode::BAD_REQUEST, "invalid request body").into_response();
            }
        };

        let submitted = submitted_token(&parts.headers, &bytes, &config);
        let valid = existing.is_some() && submitted.is_some_and(|value| token.matches(&value));
        if !valid {
            tracing::warn!(
                method = %parts.method,
                uri = %parts.uri,
                has_cookie = existing.is_some(),
                "rejected request with missing or invalid CSRF token"
            );
            return (StatusCode::FORBIDDEN, "invalid csrf token").into_response();
        }
        request = Request::from_parts(parts, Body::from(bytes));
    }

    request.extensions_mut().insert(token.clone());
    let mut response = next.run(request).await;

    if let Some(cookie) = set_cookie_value(&config, &token) {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

/// Context processor exposing `csrf_token` and a ready-made hidden
/// `csrf_token_input` to templates.
pub fn csrf_processor(
    form_field: impl Into<String>,
) -> impl Fn(&Parts, &mut RenderContext) + Send + Sync + 'static {
    let form_field = form_field.into();
    move |parts: &Parts, ctx: &mut RenderContext| {
        if let Some(token) = parts.extensions.get::<CsrfToken>() {
            ctx.insert("csrf_token", token.as_str());
            ctx.insert(
                "csrf_token_input",
                Value::from_safe_string(format!(
                    "<input type=\"hidden\" name=\"{}\" value=\"{}\" />",
                    HtmlEscape(&form_field),
                    HtmlEscape(token.as_str()),
                )),
            );
        }
    }
}
