//! Candidate producers.
//!
//! Each source runs as its own task holding a clone of the candidate sender.
//! The pipeline treats input as finished once every clone is dropped.

use crate::error::{ConfigError, ConfigResult};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Where candidates are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    /// Resolve a command-line path; `-` means standard input.
    ///
    /// A missing or unreadable file is a configuration error.
    pub fn open(path: &Path) -> ConfigResult<Self> {
        if path.as_os_str() == "-" {
            return Ok(Self::Stdin);
        }
        let meta = std::fs::metadata(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !meta.is_file() {
            return Err(ConfigError::ReadFailed {
                path: path.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }
        Ok(Self::File(path.to_path_buf()))
    }

    /// Send every line of this source to `tx`. Returns the number of lines
    /// sent; stops early on cancellation or when the receiver is gone.
    pub async fn feed(
        self,
        tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> ConfigResult<u64> {
        match &self {
            Self::File(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| ConfigError::ReadFailed {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                feed_lines(BufReader::new(file), &tx, &cancel).await
            }
            Self::Stdin => feed_lines(BufReader::new(tokio::io::stdin()), &tx, &cancel).await,
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str("<stdin>"),
        }
    }
}

/// Send each line of `reader`. Lines that are not valid UTF-8 are skipped.
async fn feed_lines<R>(
    mut reader: R,
    tx: &mpsc::Sender<String>,
    cancel: &CancellationToken,
) -> ConfigResult<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut raw = Vec::new();
    let mut lineno = 0u64;
    let mut sent = 0;

    loop {
        raw.clear();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            read = reader.read_until(b'\n', &mut raw) => read?,
        };
        if read == 0 {
            break;
        }
        lineno += 1;

        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line.trim_end_matches(|c| c == '\n' || c == '\r').to_string(),
            Err(e) => {
                warn!(line = lineno, error = %e, "skipping line that is not valid UTF-8");
                continue;
            }
        };

        let delivered = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            result = tx.send(line) => result.is_ok(),
        };
        if !delivered {
            break;
        }
        sent += 1;
    }

    Ok(sent)
}

/// Start one producer task per source.
///
/// `tx` is consumed: once every returned task finishes, the candidate
/// channel closes.
pub fn spawn_producers(
    sources: Vec<InputSource>,
    tx: mpsc::Sender<String>,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<ConfigResult<u64>>> {
    sources
        .into_iter()
        .map(|source| {
            let tx = tx.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let name = source.to_string();
                let sent = source.feed(tx, cancel).await?;
                debug!(source = %name, sent, "producer finished");
                Ok::<_, ConfigError>(sent)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio_test::{assert_err, assert_ok};

    fn file_with(lines: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(lines.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_open_dash_is_stdin() {
        assert_eq!(InputSource::open(Path::new("-")).unwrap(), InputSource::Stdin);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = assert_err!(InputSource::open(Path::new("/nonexistent/candidates.txt")));
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }

    #[test]
    fn test_open_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(InputSource::open(dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_producers_close_channel_when_done() {
        let a = file_with("a.com\nb.com\n");
        let b = file_with("c.com\n# note\n");
        let sources = vec![
            InputSource::open(a.path()).unwrap(),
            InputSource::open(b.path()).unwrap(),
        ];

        let (tx, mut rx) = mpsc::channel(16);
        let handles = spawn_producers(sources, tx, &CancellationToken::new());

        let mut got = Vec::new();
        while let Some(line) = rx.recv().await {
            got.push(line);
        }
        got.sort();
        assert_eq!(got, vec!["# note", "a.com", "b.com", "c.com"]);

        let mut total = 0;
        for handle in handles {
            total += assert_ok!(handle.await.unwrap());
        }
        assert_eq!(total, 4);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"a.com\n\xffbad\nb.com\r\nc.com").unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let sent = assert_ok!(
            InputSource::open(file.path())
                .unwrap()
                .feed(tx, CancellationToken::new())
                .await
        );

        let mut got = Vec::new();
        while let Some(line) = rx.recv().await {
            got.push(line);
        }
        assert_eq!(got, vec!["a.com", "b.com", "c.com"]);
        assert_eq!(sent, 3);
    }

    #[tokio::test]
    async fn test_cancelled_producer_stops() {
        let big: String = (0..1000).map(|i| format!("host{i}.test\n")).collect();
        let file = file_with(&big);
        let cancel = CancellationToken::new();

        // Capacity 1 and no reader: the producer blocks until cancelled.
        let (tx, _rx) = mpsc::channel(1);
        let handle = tokio::spawn(
            InputSource::open(file.path())
                .unwrap()
                .feed(tx, cancel.clone()),
        );
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        cancel.cancel();

        let sent = assert_ok!(handle.await.unwrap());
        assert!(sent < 1000);
    }
}
