//! # trellis-renderer
//!
//! minijinja-based view renderer for web handlers: directory-based template
//! resolution, a compiled-template cache keyed by name, and a pipeline of
//! context processors that can inject values (CSRF tokens, helpers) into
//! every render.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trellis_renderer::{RenderContext, Renderer};
//!
//! struct Request {
//!     csrf: Option<String>,
//! }
//!
//! fn handle(renderer: &Renderer<Request>, request: &Request) -> Vec<u8> {
//!     let mut body = Vec::new();
//!     let data = serde_json::json!({ "homelink": "/" });
//!     if let Err(err) = renderer.render(&mut body, "test.html", &data, request) {
//!         eprintln!("render failed: {err}");
//!     }
//!     body
//! }
//!
//! let mut renderer = Renderer::new();
//! renderer.add_directory("templates/");
//! renderer.use_context_processor(|request: &Request, ctx: &mut RenderContext| {
//!     if let Some(token) = &request.csrf {
//!         ctx.insert("csrf_token", token.as_str());
//!     }
//! });
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod loader;
pub mod processors;
pub mod resolver;

pub use context::RenderContext;
pub use engine::Renderer;
pub use error::RenderError;
pub use processors::{ContextProcessor, ProcessorPipeline};
pub use resolver::TemplateResolver;
