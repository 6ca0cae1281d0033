//! Router, shared state and page handlers.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use minijinja::value::{Rest, Value};
use serde_json::json;

use trellis_core::{AppConfig, CsrfConfig, RendererConfig};
use trellis_renderer::Renderer;

use crate::csrf::{self, csrf_processor};
use crate::routes::RouteTable;

pub const HOME_PATH: &str = "/";
pub const FORM_PATH: &str = "/form/{parameter}";
pub const PAGE_TEMPLATE: &str = "test.html";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<Renderer<Parts>>,
    pub routes: Arc<RouteTable>,
}

/// The demo's named routes.
pub fn route_table() -> RouteTable {
    let mut routes = RouteTable::new();
    routes.add("home", HOME_PATH).add("form", FORM_PATH);
    routes
}

/// Renderer with the `url()` helper and the CSRF context processor installed.
pub fn build_renderer(
    config: &RendererConfig,
    csrf: &CsrfConfig,
    routes: Arc<RouteTable>,
) -> Renderer<Parts> {
    let mut renderer = Renderer::from_config(config);
    renderer
        .environment_mut()
        .add_function("url", move |name: String, params: Rest<Value>| {
            routes.reverse(&name, &params.0)
        });
    renderer.use_context_processor(csrf_processor(csrf.form_field.clone()));
    renderer
}

/// Full application router for `config`.
pub fn router(config: &AppConfig) -> Router {
    let routes = Arc::new(route_table());
    let renderer = build_renderer(&config.renderer, &config.server.csrf, Arc::clone(&routes));
    let state = AppState {
        renderer: Arc::new(renderer),
        routes,
    };
    let csrf_config = Arc::new(config.server.csrf.clone());

    Router::new()
        .route(HOME_PATH, get(page))
        .route(FORM_PATH, post(page))
        .layer(middleware::from_fn_with_state(csrf_config, csrf::protect))
        .with_state(state)
}

async fn page(State(state): State<AppState>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();
    let data = json!({ "homelink": state.routes.reverse::<&str>("home", &[]) });

    let mut body = Vec::new();
    match state.renderer.render(&mut body, PAGE_TEMPLATE, &data, &parts) {
        Ok(()) => Html(body).into_response(),
        Err(err) => {
            tracing::error!(
                template = PAGE_TEMPLATE,
                uri = %parts.uri,
                error = %err,
                "render failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}
