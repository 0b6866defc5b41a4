//! Result sink: appends confirmed-alive targets to durable output.
//!
//! The sink does not stop when the run is cancelled. It keeps writing until
//! its input channel is closed and empty, and only then reports the
//! cancellation. A write failure ends it immediately.

use crate::error::{SinkError, SinkResult};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Newline-delimited writer over any async byte sink.
pub struct ResultSink<W> {
    writer: BufWriter<W>,
    written: u64,
}

impl ResultSink<File> {
    /// Create (or truncate) the output file at `path`.
    pub async fn create(path: &Path) -> SinkResult<Self> {
        let file = File::create(path).await.map_err(|source| SinkError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<W: AsyncWrite + Unpin + Send> ResultSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    /// Like [`ResultSink::new`] with an explicit buffer size in bytes.
    pub fn with_capacity(capacity: usize, writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, writer),
            written: 0,
        }
    }

    /// Lines written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    async fn write_line(&mut self, line: &str) -> SinkResult<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.written += 1;
        Ok(())
    }

    /// Write every item from `rx` until the channel closes, then flush.
    ///
    /// Returns the number of lines written, or [`SinkError::Cancelled`]
    /// carrying that count if `cancel` fired during the run.
    pub async fn drain<T: AsRef<str>>(
        mut self,
        mut rx: mpsc::Receiver<T>,
        cancel: &CancellationToken,
    ) -> SinkResult<u64> {
        while let Some(item) = rx.recv().await {
            self.write_line(item.as_ref()).await?;
        }
        self.writer.flush().await?;

        if cancel.is_cancelled() {
            warn!(written = self.written, "sink drained after cancellation");
            return Err(SinkError::Cancelled {
                written: self.written,
            });
        }

        debug!(written = self.written, "sink finished");
        Ok(self.written)
    }
}
