use std::sync::Arc;

use futures::StreamExt;

use super::{Handler, Middleware};
use crate::agent::Invocation;
use crate::config::AgentryConfig;
use crate::context::RunContext;
use crate::stream::MessageStream;
use crate::util::retry::RetryPolicy;

/// Re-runs the wrapped handler on retryable failures.
///
/// A retry only happens while nothing has been yielded yet; once a message
/// reached the consumer, a later error is passed through unchanged.
#[derive(Debug, Clone, Default)]
pub struct Retry {
    policy: RetryPolicy,
}

impl Retry {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &AgentryConfig) -> Self {
        Self::new(RetryPolicy::from(&config.retry))
    }
}

impl Middleware for Retry {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(RetryHandler {
            next,
            policy: self.policy.clone(),
        })
    }
}

struct RetryHandler {
    next: Arc<dyn Handler>,
    policy: RetryPolicy,
}

impl Handler for RetryHandler {
    fn handle(&self, ctx: RunContext, invocation: Invocation) -> MessageStream {
        let next = self.next.clone();
        let policy = self.policy.clone();
        Box::pin(async_stream::stream! {
            let mut attempt = 0u32;
            'attempts: loop {
                attempt += 1;
                let mut inner = next.handle(ctx.clone(), invocation.clone());
                let mut yielded = false;
                while let Some(item) = inner.next().await {
                    match item {
                        Ok(message) => {
                            yielded = true;
                            yield Ok(message);
                        }
                        Err(error) if !yielded && !ctx.is_canceled() && policy.should_retry(attempt, &error) => {
                            tracing::warn!(
                                invocation_id = %invocation.id,
                                attempt,
                                max_attempts = policy.max_attempts,
                                error = %error,
                                "retrying invocation"
                            );
                            drop(inner);
                            tokio::time::sleep(policy.delay(attempt)).await;
                            continue 'attempts;
                        }
                        Err(error) => {
                            yield Err(error);
                            break 'attempts;
                        }
                    }
                }
                break;
            }
        })
    }
}
