use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::Waker;

/// Bytes written to a [`FakeBuffer`], shared with the test.
pub(crate) type SentLog = Arc<Mutex<Vec<u8>>>;

/// Answers every `P0` written to it with the next canned reply.
/// Reads end with EOF once all replies are used up.
pub(crate) struct FakeBuffer {
    replies: VecDeque<Vec<u8>>,
    response_buf: Vec<u8>,
    reader: Option<Waker>,
    sent: SentLog,
}

impl FakeBuffer {
    pub(crate) fn new(replies: Vec<Vec<u8>>) -> (Self, SentLog) {
        let sent = SentLog::default();
        (
            Self {
                replies: replies.into(),
                response_buf: Vec::new(),
                reader: None,
                sent: sent.clone(),
            },
            sent,
        )
    }
}

impl tokio::io::AsyncRead for FakeBuffer {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        if !self.response_buf.is_empty() {
            let c = buf.remaining().min(self.response_buf.len());
            buf.put_slice(&self.response_buf[0..c]);
            self.response_buf.drain(0..c);
        } else if !self.replies.is_empty() {
            self.reader = Some(cx.waker().clone());
            return std::task::Poll::Pending;
        }
        std::task::Poll::Ready(Ok(()))
    }
}

impl tokio::io::AsyncWrite for FakeBuffer {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> std::task::Poll<std::result::Result<usize, std::io::Error>> {
        self.sent
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "poisoned"))?
            .extend_from_slice(buf);
        if buf.windows(2).any(|w| w == b"P0") {
            if let Some(reply) = self.replies.pop_front() {
                self.response_buf.extend_from_slice(&reply);
            }
            if let Some(waker) = self.reader.take() {
                waker.wake();
            }
        }
        std::task::Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), std::io::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), std::io::Error>> {
        std::task::Poll::Ready(Ok(()))
    }
}
