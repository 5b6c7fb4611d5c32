//! Stream adapters between the store body and the client body.

use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::{ByteStream, ObjectLocator};

/// Tracks one client pipe. Dropped before `expected` bytes went out means
/// the consumer went away early.
struct PipeGuard {
    locator: ObjectLocator,
    expected: u64,
    forwarded: u64,
    finished: bool,
}

impl PipeGuard {
    fn new(locator: ObjectLocator, expected: u64) -> Self {
        Self {
            locator,
            expected,
            forwarded: 0,
            finished: false,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        debug!(
            locator = %self.locator,
            bytes = self.forwarded,
            "stream completed"
        );
    }

    fn fail(&mut self, reason: &dyn std::fmt::Display) {
        self.finished = true;
        warn!(
            locator = %self.locator,
            bytes = self.forwarded,
            expected = self.expected,
            error = %reason,
            "upstream read failed mid-stream"
        );
    }
}

impl Drop for PipeGuard {
    fn drop(&mut self) {
        if !self.finished && self.forwarded < self.expected {
            warn!(
                locator = %self.locator,
                bytes = self.forwarded,
                expected = self.expected,
                "client disconnected; aborting upstream read"
            );
        }
    }
}

/// Forward `upstream` chunk by chunk, ending after `expected` bytes.
///
/// Dropping the returned stream drops `upstream` with it, which aborts the
/// store read. A chunk that takes longer than `idle_timeout` ends the
/// stream with `TimedOut`.
pub(crate) fn guarded(
    upstream: ByteStream,
    locator: ObjectLocator,
    expected: u64,
    idle_timeout: Duration,
) -> ByteStream {
    let stream = async_stream::stream! {
        let mut guard = PipeGuard::new(locator, expected);
        let mut upstream = upstream;
        loop {
            match tokio::time::timeout(idle_timeout, upstream.next()).await {
                Ok(Some(Ok(mut chunk))) => {
                    let room = guard.expected.saturating_sub(guard.forwarded);
                    if chunk.len() as u64 > room {
                        chunk.truncate(room as usize);
                    }
                    guard.forwarded += chunk.len() as u64;
                    // The consumer may stop polling once it has the declared
                    // length, so the final chunk has to settle the guard.
                    if guard.forwarded >= guard.expected {
                        guard.finish();
                    }
                    yield Ok(chunk);
                    if guard.finished {
                        break;
                    }
                }
                Ok(Some(Err(e))) => {
                    guard.fail(&e);
                    yield Err(e);
                    break;
                }
                Ok(None) => {
                    guard.finish();
                    break;
                }
                Err(_) => {
                    let err = std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("no data from store for {}s", idle_timeout.as_secs()),
                    );
                    guard.fail(&err);
                    yield Err(err);
                    break;
                }
            }
        }
    };
    Box::pin(stream)
}

/// Cut `[skip, skip + take)` out of a whole-object stream, for stores that
/// cannot serve ranges themselves.
pub(crate) fn slice(upstream: ByteStream, skip: u64, take: u64) -> ByteStream {
    let stream = async_stream::stream! {
        let mut upstream = upstream;
        let mut to_skip = skip;
        let mut remaining = take;
        while remaining > 0 {
            let chunk: Bytes = match upstream.next().await {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    yield Err(e);
                    break;
                }
                None => break,
            };

            let len = chunk.len() as u64;
            if to_skip >= len {
                to_skip -= len;
                continue;
            }

            let from = to_skip as usize;
            let until = (to_skip + remaining).min(len) as usize;
            to_skip = 0;
            remaining -= (until - from) as u64;
            yield Ok(chunk.slice(from..until));
        }
    };
    Box::pin(stream)
}
