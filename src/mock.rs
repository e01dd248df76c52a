//! Scripted in-memory channel for driving the session and transport tests.

use core::time::Duration;
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_io_async::{ErrorKind, ErrorType, Write};

use crate::channel::Channel;

/// What the next `read_with_timeout` call observes.
pub(crate) enum Step {
    /// Bytes arrive on the wire.
    Chunk(&'static [u8]),
    /// The line stays quiet until the timeout expires (or EOF).
    Quiet,
    /// The transport breaks.
    Fail,
}

pub(crate) struct MockChannel {
    pub steps: VecDeque<Step>,
    /// Every byte the driver wrote, across all requests.
    pub written: Vec<u8>,
    /// The timeout passed to each read, in order.
    pub timeouts: Vec<Option<Duration>>,
    pub fail_writes: bool,
}

impl MockChannel {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        MockChannel {
            steps: steps.into_iter().collect(),
            written: Vec::new(),
            timeouts: Vec::new(),
            fail_writes: false,
        }
    }
}

impl ErrorType for MockChannel {
    type Error = ErrorKind;
}

impl Write for MockChannel {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(ErrorKind::Other);
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }
}

impl Channel for MockChannel {
    async fn read_with_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Option<Duration>,
    ) -> Result<usize, Self::Error> {
        self.timeouts.push(timeout);
        match self.steps.pop_front() {
            Some(Step::Chunk(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            // An exhausted script behaves like a dead-quiet line.
            Some(Step::Quiet) | None => Ok(0),
            Some(Step::Fail) => Err(ErrorKind::Other),
        }
    }
}
