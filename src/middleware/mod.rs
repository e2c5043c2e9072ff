//! Handler wrapping in "onion" order.
//!
//! `chain([m1, m2, m3]).wrap(terminal)` yields `m1(m2(m3(terminal)))`: requests
//! travel outer to inner, streamed messages travel inner to outer. Order is
//! observable, e.g. [`Retry`] outside [`Logging`] logs every attempt while
//! [`Retry`] inside [`Logging`] logs once.

mod logging;
mod retry;

pub use logging::Logging;
pub use retry::Retry;

use std::sync::Arc;

use crate::agent::Invocation;
use crate::context::RunContext;
use crate::stream::MessageStream;

/// Uniform contract: one invocation in, a lazy message sequence out.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: RunContext, invocation: Invocation) -> MessageStream;
}

/// Transforms a handler into a new handler.
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler>;
}

/// Ordered composition of middlewares; the first entry is outermost.
#[derive(Clone, Default)]
pub struct Chain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl Middleware for Chain {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        self.middlewares
            .iter()
            .rev()
            .fold(next, |handler, middleware| middleware.wrap(handler))
    }
}

/// Compose middlewares so that the first is the outermost wrapper.
pub fn chain(middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Chain {
    Chain {
        middlewares: middlewares.into_iter().collect(),
    }
}

struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(RunContext, Invocation) -> MessageStream + Send + Sync,
{
    fn handle(&self, ctx: RunContext, invocation: Invocation) -> MessageStream {
        (self.0)(ctx, invocation)
    }
}

/// Build a handler from a closure.
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(RunContext, Invocation) -> MessageStream + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Arc<dyn Handler>) -> Arc<dyn Handler> + Send + Sync,
{
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        (self.0)(next)
    }
}

/// Build a middleware from a closure.
pub fn from_fn<F>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(Arc<dyn Handler>) -> Arc<dyn Handler> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware(f))
}
