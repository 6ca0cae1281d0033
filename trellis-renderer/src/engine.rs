//! minijinja rendering engine: the [`Renderer`] facade.
//!
//! # Render steps
//!
//! | Step | What happens                                        | Failure                    |
//! |------|-----------------------------------------------------|----------------------------|
//! | 1    | fetch compiled template (cache keyed by name)       | `RenderError::Engine`      |
//! | 2    | payload must be a string-keyed map                  | `RenderError::DataFormat`  |
//! | 3    | context processors run in registration order        | none                       |
//! | 4    | template executes, streaming into the writer        | `RenderError::Engine`      |
//!
//! Nothing is retried. A failure in step 4 may leave partial output behind.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::{Environment, Template, UndefinedBehavior, Value};
use serde::Serialize;

use trellis_core::RendererConfig;

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::loader;
use crate::processors::ProcessorPipeline;
use crate::resolver::TemplateResolver;

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// View renderer for requests of type `R`.
///
/// Configure once at startup (every setter takes `&mut self`), then share
/// behind an `Arc` with all request handlers.
pub struct Renderer<R> {
    env: Environment<'static>,
    resolver: Arc<TemplateResolver>,
    processors: ProcessorPipeline<R>,
    debug: bool,
}

impl<R> Renderer<R> {
    /// Construct a renderer with no search directories and no processors.
    pub fn new() -> Self {
        let resolver = Arc::new(TemplateResolver::new());
        let mut env = Environment::new();
        loader::install(&mut env, Arc::clone(&resolver));
        Renderer {
            env,
            resolver,
            processors: ProcessorPipeline::new(),
            debug: false,
        }
    }

    /// Construct a renderer from the `renderer` config section.
    pub fn from_config(config: &RendererConfig) -> Self {
        let mut renderer = Self::new();
        for dir in &config.template_dirs {
            renderer.add_directory(dir);
        }
        renderer.set_debug(config.debug);
        renderer.set_strict_undefined(config.strict_undefined);
        renderer.set_globals(
            config
                .globals
                .iter()
                .map(|(name, value)| (name.clone(), Value::from_serialize(value))),
        );
        renderer
    }

    // -- configuration ------------------------------------------------------

    /// Append a template search directory.
    pub fn add_directory(&mut self, dir: impl Into<PathBuf>) {
        Arc::make_mut(&mut self.resolver).add_directory(dir);
        loader::install(&mut self.env, Arc::clone(&self.resolver));
    }

    pub fn directories(&self) -> &[PathBuf] {
        self.resolver.directories()
    }

    /// In debug mode the engine keeps extra error context and the requested
    /// template is re-read and recompiled on every render.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        self.env.set_debug(debug);
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Make access to undefined variables an execution error.
    pub fn set_strict_undefined(&mut self, strict: bool) {
        let behavior = if strict {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        };
        self.env.set_undefined_behavior(behavior);
    }

    /// Expose `value` to every template as `name`.
    pub fn add_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.env.add_global(name.into(), value.into());
    }

    pub fn set_globals<I, K, V>(&mut self, globals: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in globals {
            self.add_global(name, value);
        }
    }

    /// Append a processor to the pipeline.
    pub fn use_context_processor<F>(&mut self, processor: F)
    where
        F: Fn(&R, &mut RenderContext) + Send + Sync + 'static,
    {
        self.processors.register(processor);
    }

    pub fn processors(&self) -> &ProcessorPipeline<R> {
        &self.processors
    }

    /// Underlying environment, for registering functions, filters and tests.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Resolve `name` as if included from `base`.
    pub fn resolve(&self, base: &Path, name: &str) -> PathBuf {
        self.resolver.resolve(base, name)
    }

    // -- rendering ----------------------------------------------------------

    /// Render `name` with `data` for `request`, streaming into `output`.
    pub fn render<W, T>(
        &self,
        output: W,
        name: &str,
        data: &T,
        request: &R,
    ) -> Result<(), RenderError>
    where
        W: io::Write,
        T: Serialize + ?Sized,
    {
        let fresh;
        let template = if self.debug {
            fresh = self.fresh_environment(name)?;
            fresh.get_template(name)?
        } else {
            self.env.get_template(name)?
        };
        let ctx = self.prepare(RenderContext::from_data(data)?, request);
        execute(&template, &ctx, output)
    }

    /// Like [`Renderer::render`] for callers that already hold a context.
    pub fn render_context<W: io::Write>(
        &self,
        output: W,
        name: &str,
        ctx: RenderContext,
        request: &R,
    ) -> Result<(), RenderError> {
        let fresh;
        let template = if self.debug {
            fresh = self.fresh_environment(name)?;
            fresh.get_template(name)?
        } else {
            self.env.get_template(name)?
        };
        let ctx = self.prepare(ctx, request);
        execute(&template, &ctx, output)
    }

    /// Render into an owned string.
    pub fn render_to_string<T>(&self, name: &str, data: &T, request: &R) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
    {
        let mut out = Vec::new();
        self.render(&mut out, name, data, request)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn prepare(&self, mut ctx: RenderContext, request: &R) -> RenderContext {
        self.processors.run(request, &mut ctx);
        tracing::debug!(
            processors = self.processors.len(),
            keys = ctx.len(),
            "render context prepared"
        );
        ctx
    }

    /// Copy of the environment with `name` re-read from disk and compiled.
    /// Includes still go through the shared loader.
    fn fresh_environment(&self, name: &str) -> Result<Environment<'static>, RenderError> {
        let Some(source) = loader::load_template(&self.resolver, name)? else {
            return Err(minijinja::Error::new(
                minijinja::ErrorKind::TemplateNotFound,
                format!("template {name:?} does not exist"),
            )
            .into());
        };
        let mut env = self.env.clone();
        env.add_template_owned(name.to_string(), source)?;
        tracing::debug!(template = name, "recompiled template");
        Ok(env)
    }
}

fn execute<W: io::Write>(
    template: &Template<'_, '_>,
    ctx: &RenderContext,
    output: W,
) -> Result<(), RenderError> {
    tracing::debug!(template = template.name(), "executing template");
    template.render_to_write(ctx, output)?;
    Ok(())
}

impl<R> Default for Renderer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Renderer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("dirs", &self.resolver.directories())
            .field("processors", &self.processors)
            .field("debug", &self.debug)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
