//! Context processor pipeline.

use std::fmt;

use crate::context::RenderContext;

/// A function that augments the render context before execution.
///
/// Receives the request the render was made for and the mutable context.
/// Processors have no error channel.
pub type ContextProcessor<R> = Box<dyn Fn(&R, &mut RenderContext) + Send + Sync>;

/// Ordered list of processors, run on every render in registration order.
pub struct ProcessorPipeline<R> {
    processors: Vec<ContextProcessor<R>>,
}

impl<R> ProcessorPipeline<R> {
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Append a processor. A later processor overwrites keys set by earlier ones.
    pub fn register<F>(&mut self, processor: F)
    where
        F: Fn(&R, &mut RenderContext) + Send + Sync + 'static,
    {
        self.processors.push(Box::new(processor));
    }

    pub fn run(&self, request: &R, ctx: &mut RenderContext) {
        for processor in &self.processors {
            processor(request, ctx);
        }
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl<R> Default for ProcessorPipeline<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for ProcessorPipeline<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorPipeline")
            .field("len", &self.processors.len())
            .finish()
    }
}
