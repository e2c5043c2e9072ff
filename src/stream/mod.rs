//! Lazy, pull-based message sequences.
//!
//! A [`MessageStream`] only does work while its consumer polls it. Dropping
//! the stream is the cancellation signal: the producer is never resumed, so no
//! further model calls, tool calls or loop iterations happen. An error item is
//! always the last item of a sequence.

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::error::{AgentryError, Result};
use crate::types::Message;

/// Lazy sequence of messages produced by an invocation.
pub type MessageStream = BoxStream<'static, Result<Message>>;

/// A sequence yielding a single message.
pub fn once(message: Message) -> MessageStream {
    Box::pin(futures::stream::once(async move { Ok(message) }))
}

/// A sequence yielding a single error.
pub fn fail(error: AgentryError) -> MessageStream {
    Box::pin(futures::stream::once(async move { Err(error) }))
}

/// Fuse a sequence so that nothing is produced after the first error.
pub fn terminate_on_error(stream: MessageStream) -> MessageStream {
    Box::pin(async_stream::stream! {
        let mut inner = stream;
        while let Some(item) = inner.next().await {
            let failed = item.is_err();
            yield item;
            if failed {
                break;
            }
        }
    })
}

/// Drive a sequence with a continuation.
///
/// `next` is called once per item; returning `false` stops the sequence and
/// drops it, so the producer performs no further work. Delivery also stops
/// after an error item. Returns the number of items delivered.
pub async fn drive<F>(stream: MessageStream, mut next: F) -> usize
where
    F: FnMut(Result<Message>) -> bool,
{
    let mut stream = stream;
    let mut delivered = 0;
    while let Some(item) = stream.next().await {
        delivered += 1;
        let failed = item.is_err();
        if !next(item) || failed {
            break;
        }
    }
    delivered
}

/// Drain a sequence, returning the last message or the first error.
pub async fn collect_last(stream: MessageStream) -> Result<Option<Message>> {
    let mut stream = stream;
    let mut last = None;
    while let Some(item) = stream.next().await {
        last = Some(item?);
    }
    Ok(last)
}

/// Drain a sequence into a vector, stopping at the first error.
pub async fn collect_all(stream: MessageStream) -> Result<Vec<Message>> {
    let mut stream = stream;
    let mut messages = Vec::new();
    while let Some(item) = stream.next().await {
        messages.push(item?);
    }
    Ok(messages)
}
