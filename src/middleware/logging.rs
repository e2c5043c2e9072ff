use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tracing::{debug, info, warn};

use super::{Handler, Middleware};
use crate::agent::Invocation;
use crate::context::RunContext;
use crate::stream::MessageStream;

/// Structured `tracing` events around each invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logging;

impl Middleware for Logging {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(LoggingHandler { next })
    }
}

struct LoggingHandler {
    next: Arc<dyn Handler>,
}

impl Handler for LoggingHandler {
    fn handle(&self, ctx: RunContext, invocation: Invocation) -> MessageStream {
        let next = self.next.clone();
        Box::pin(async_stream::stream! {
            let agent = ctx.agent().unwrap_or("-").to_string();
            let invocation_id = invocation.id.clone();
            let started = Instant::now();
            info!(
                invocation_id = %invocation_id,
                agent = %agent,
                streamable = invocation.streamable,
                resumable = invocation.resumable,
                "invocation started"
            );

            let mut inner = next.handle(ctx, invocation);
            let mut yielded = 0usize;
            while let Some(item) = inner.next().await {
                match &item {
                    Ok(message) => {
                        yielded += 1;
                        debug!(
                            invocation_id = %invocation_id,
                            role = %message.role,
                            status = %message.status,
                            "message"
                        );
                    }
                    Err(error) => {
                        warn!(
                            invocation_id = %invocation_id,
                            agent = %agent,
                            error = %error,
                            "invocation failed"
                        );
                    }
                }
                yield item;
            }

            info!(
                invocation_id = %invocation_id,
                agent = %agent,
                yielded,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "invocation finished"
            );
        })
    }
}
