//! Demo web application: axum routes rendered through trellis-renderer, with
//! CSRF tokens and a `url()` helper injected into every template.

pub mod app;
pub mod csrf;
mod error;
pub mod routes;
mod runtime;

pub use app::{build_renderer, router, AppState};
pub use csrf::{csrf_processor, CsrfToken};
pub use error::ServerError;
pub use routes::RouteTable;
pub use runtime::{init_tracing, run, start_blocking};
