//! Streaming deduplication.

use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Forwards each distinct value once, in first-seen order.
///
/// The seen-set belongs to one instance and grows with the number of
/// distinct inputs; build a fresh instance per run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

/// Counters reported when the stage finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub received: u64,
    pub forwarded: u64,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value`; returns `true` the first time it is seen.
    ///
    /// Values are keyed on their trimmed form.
    pub fn first_seen(&mut self, value: &str) -> bool {
        let key = value.trim();
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.to_string())
    }

    /// Number of distinct values seen so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Consume `input` until it closes, forwarding first occurrences.
    ///
    /// `output` is dropped on return, closing it for downstream.
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<String>,
        output: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> DedupStats {
        let mut stats = DedupStats::default();

        loop {
            let value = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                value = input.recv() => match value {
                    Some(value) => value,
                    None => break,
                },
            };
            stats.received += 1;

            if !self.first_seen(&value) {
                continue;
            }
            let delivered = tokio::select! {
                biased;
                _ = cancel.cancelled() => false,
                sent = output.send(value.trim().to_string()) => sent.is_ok(),
            };
            if !delivered {
                break;
            }
            stats.forwarded += 1;
        }

        debug!(
            received = stats.received,
            forwarded = stats.forwarded,
            "dedup finished"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.first_seen("a"));
        assert!(!dedup.first_seen("a"));
        assert!(!dedup.first_seen("  a "));
        assert!(dedup.first_seen("b"));
        assert_eq!(dedup.len(), 2);
    }

    #[tokio::test]
    async fn test_preserves_first_seen_order() {
        let (in_tx, in_rx) = mpsc::channel(16);
        let (out_tx, mut out_rx) = mpsc::channel(16);

        for v in ["a", "b", "a", "c", "b"] {
            in_tx.send(v.to_string()).await.unwrap();
        }
        drop(in_tx);

        let stats = Deduplicator::new()
            .run(in_rx, out_tx, CancellationToken::new())
            .await;

        let mut out = Vec::new();
        while let Some(v) = out_rx.recv().await {
            out.push(v);
        }
        assert_eq!(out, vec!["a", "b", "c"]);
        assert_eq!(stats, DedupStats { received: 5, forwarded: 3 });
    }

    #[tokio::test]
    async fn test_multiple_producers_close_output_when_all_done() {
        let (in_tx, in_rx) = mpsc::channel(4);
        let (out_tx, mut out_rx) = mpsc::channel(4);
        let stage = tokio::spawn(Deduplicator::new().run(in_rx, out_tx, CancellationToken::new()));

        let producers: Vec<_> = (0..3)
            .map(|p| {
                let tx = in_tx.clone();
                tokio::spawn(async move {
                    for i in 0..10 {
                        tx.send(format!("host{}", (i + p) % 12)).await.unwrap();
                    }
                })
            })
            .collect();
        drop(in_tx);

        let mut out = Vec::new();
        while let Some(v) = out_rx.recv().await {
            out.push(v);
        }
        for p in producers {
            p.await.unwrap();
        }

        let stats = stage.await.unwrap();
        assert_eq!(stats.received, 30);
        assert_eq!(out.len(), 12);
        let mut sorted = out.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), out.len());
    }
}
