use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// Callback invoked with the running byte total after each read.
pub type ProgressCallback = Box<dyn Fn(u64) + Send + Sync>;

/// Wraps a reader and counts the bytes read through it.
pub struct ProgressReader<R> {
    inner: R,
    bytes_read: u64,
    on_progress: Option<ProgressCallback>,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
            on_progress: None,
        }
    }

    /// Registers a callback for every read that returned data.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let read = (buf.filled().len() - before) as u64;
                if read > 0 {
                    this.bytes_read += read;
                    if let Some(cb) = &this.on_progress {
                        cb(this.bytes_read);
                    }
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
