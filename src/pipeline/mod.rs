//! The probing pipeline.
//!
//! ```text
//! producers ─► candidates ─► dedup ─► normalizer ─► work ─► workers ─► alive ─► sink
//! ```
//!
//! Every stage owns the sender of its output channel and drops it only after
//! its input is closed and drained, or after it sees cancellation, so
//! closure flows downstream and nothing is left blocked. The work queue and
//! the alive channel are bounded; a full channel blocks its producer, which
//! is the only throttle. The sink is the last to return and reports
//! cancellation once everything already classified alive has been written.

mod dedup;
mod normalize;
mod report;
mod sink;

pub use dedup::{DedupStats, Deduplicator};
pub use normalize::{NormalizeStats, Normalizer};
pub use report::RunReport;
pub use sink::ResultSink;

use crate::config::ProbeConfig;
use crate::error::{PipelineError, PipelineResult, SinkError};
use crate::prober::{HttpProber, Prober, WorkerPool};
use crate::proxy::{clients_for_workers, ProxyPool};
use crate::types::RunId;
use chrono::Utc;
use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

/// One configured pipeline. Each call to [`Pipeline::run`] is an
/// independent run with its own dedup and emission state.
pub struct Pipeline {
    config: Arc<ProbeConfig>,
    proxies: Arc<ProxyPool>,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    /// Validate `config` and bind the proxy pool used for client assignment.
    pub fn new(config: ProbeConfig, proxies: Arc<ProxyPool>) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            proxies,
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe every candidate received on `candidates` with HTTP workers.
    ///
    /// Proxies are spread over the workers in balanced, shuffled order (see
    /// [`clients_for_workers`]); an empty pool means direct clients.
    pub async fn run<W>(
        &self,
        candidates: mpsc::Receiver<String>,
        sink: ResultSink<W>,
        cancel: &CancellationToken,
    ) -> PipelineResult<RunReport>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let clients = clients_for_workers(&self.config, &self.proxies, self.config.concurrency)
            .map_err(PipelineError::Client)?;
        let probers = clients
            .into_iter()
            .map(|client| {
                Arc::new(HttpProber::new(client, Arc::clone(&self.config))) as Arc<dyn Prober>
            })
            .collect();

        self.run_with_probers(candidates, probers, sink, cancel).await
    }

    /// Run the pipeline with caller-supplied probers, one worker each.
    pub async fn run_with_probers<W>(
        &self,
        candidates: mpsc::Receiver<String>,
        probers: Vec<Arc<dyn Prober>>,
        sink: ResultSink<W>,
        cancel: &CancellationToken,
    ) -> PipelineResult<RunReport>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let run_id = RunId::new();
        let span = info_span!("run", id = %run_id.short());
        self.execute(run_id, candidates, probers, sink, cancel.child_token())
            .instrument(span)
            .await
    }

    async fn execute<W>(
        &self,
        run_id: RunId,
        candidates: mpsc::Receiver<String>,
        probers: Vec<Arc<dyn Prober>>,
        sink: ResultSink<W>,
        cancel: CancellationToken,
    ) -> PipelineResult<RunReport>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut report = RunReport::new(run_id, Utc::now());
        report.workers = probers.len();
        report.proxies = self.proxies.count();
        info!(
            workers = report.workers,
            proxies = report.proxies,
            "pipeline starting"
        );

        let capacity = self.config.queue_capacity;
        let (unique_tx, unique_rx) = mpsc::channel(capacity);
        let (work_tx, work_rx) = mpsc::channel(capacity);
        let (alive_tx, alive_rx) = mpsc::channel(capacity);

        let dedup = tokio::spawn(
            Deduplicator::new()
                .run(candidates, unique_tx, cancel.clone())
                .in_current_span(),
        );
        let normalize = tokio::spawn(
            Normalizer::new(&self.config)
                .run(unique_rx, work_tx, cancel.clone())
                .in_current_span(),
        );
        let mut pool = WorkerPool::new(probers);
        if let Some(progress) = &self.progress {
            pool = pool.with_progress(progress.clone());
        }
        let probe = tokio::spawn(pool.run(work_rx, alive_tx, cancel.clone()).in_current_span());

        let sunk = sink.drain(alive_rx, &cancel).await;
        if let Err(SinkError::Write(e)) = &sunk {
            warn!(error = %e, "output write failed, stopping run");
            cancel.cancel();
        }

        let dedup = join("dedup", dedup).await?;
        let normalize = join("normalize", normalize).await?;
        let snapshot = join("probe", probe).await??;

        report.candidates_received = dedup.received;
        report.unique_candidates = dedup.forwarded;
        report.targets_queued = normalize.targets;
        report.record_probes(snapshot);
        report.finish();

        match sunk {
            Ok(written) => {
                report.written = written;
                info!(
                    probed = report.probed,
                    alive = report.alive,
                    written = report.written,
                    duration_ms = report.duration_ms,
                    "pipeline finished"
                );
                Ok(report)
            }
            Err(SinkError::Cancelled { written }) => {
                report.written = written;
                report.cancelled = true;
                warn!(
                    probed = report.probed,
                    written = report.written,
                    "pipeline cancelled"
                );
                Err(PipelineError::Cancelled(Box::new(report)))
            }
            Err(e) => Err(PipelineError::Sink(e)),
        }
    }
}

async fn join<T>(stage: &'static str, handle: JoinHandle<T>) -> PipelineResult<T> {
    handle
        .await
        .map_err(|e| PipelineError::Stage(stage, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::prober::ProbeOutcome;
    use crate::types::Target;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::future::Future;
    use std::io;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{ready, Context, Poll};
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{any, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> ProbeConfig {
        ProbeConfig::default()
            .with_concurrency(4)
            .with_retries(0)
            .with_system_proxy(false)
            .with_timeout(Duration::from_secs(5))
    }

    async fn feed(lines: &[String]) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            tx.send(line.clone()).await.unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn test_end_to_end_writes_alive_targets() {
        let server = MockServer::start().await;
        Mock::given(path("/up"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let up = format!("{}/up", server.uri());
        let down = format!("{}/down", server.uri());
        let rx = feed(&[
            up.clone(),
            down.clone(),
            up.clone(),
            "# comment".to_string(),
            String::new(),
        ])
        .await;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("alive.txt");
        let sink = ResultSink::create(&out).await.unwrap();

        let pipeline = Pipeline::new(config(), Arc::new(ProxyPool::new())).unwrap();
        let report = pipeline
            .run(rx, sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.candidates_received, 5);
        assert_eq!(report.unique_candidates, 4);
        assert_eq!(report.targets_queued, 2);
        assert_eq!(report.probed, 2);
        assert_eq!(report.alive, 1);
        assert_eq!(report.not_alive, 1);
        assert_eq!(report.written, 1);
        assert!(!report.cancelled);

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, format!("{up}\n"));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let result = Pipeline::new(
            ProbeConfig::default().with_concurrency(0),
            Arc::new(ProxyPool::new()),
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    /// Alive after a short delay, or blocks until cancelled for "/slow".
    struct StubProber;

    #[async_trait]
    impl Prober for StubProber {
        async fn probe(&self, target: &Target, cancel: &CancellationToken) -> ProbeOutcome {
            if target.url().path() == "/slow" {
                cancel.cancelled().await;
                return ProbeOutcome::aborted(target.clone(), ProbeError::Cancelled);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            ProbeOutcome::alive(target.clone(), 200, 1)
        }
    }

    #[tokio::test]
    async fn test_cancellation_flushes_alive_results() {
        let (tx, rx) = mpsc::channel(64);
        for i in 0..20 {
            tx.send(format!("http://fast{i}.test/")).await.unwrap();
        }
        for i in 0..4 {
            tx.send(format!("http://hang{i}.test/slow")).await.unwrap();
        }

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("alive.txt");
        let sink = ResultSink::create(&out).await.unwrap();

        let probers: Vec<Arc<dyn Prober>> = (0..4)
            .map(|_| Arc::new(StubProber) as Arc<dyn Prober>)
            .collect();
        let pipeline = Pipeline::new(config(), Arc::new(ProxyPool::new())).unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        // The candidate sender stays open, so only cancellation ends the run.
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            pipeline.run_with_probers(rx, probers, sink, &cancel),
        )
        .await
        .expect("pipeline did not stop on cancellation");
        drop(tx);

        let report = match result {
            Err(PipelineError::Cancelled(report)) => report,
            other => panic!("expected cancellation, got {other:?}"),
        };
        assert!(report.cancelled);
        assert_eq!(report.alive, 20);
        assert_eq!(report.written, 20);
        assert_eq!(report.aborted, 4);

        let lines: HashSet<_> = std::fs::read_to_string(&out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|l| l.starts_with("http://fast")));
    }

    /// Sleeps before accepting every write.
    struct SlowWriter {
        buf: Arc<Mutex<Vec<u8>>>,
        delay: Duration,
        sleep: Option<Pin<Box<tokio::time::Sleep>>>,
    }

    impl AsyncWrite for SlowWriter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            data: &[u8],
        ) -> Poll<io::Result<usize>> {
            let delay = self.delay;
            let sleep = self
                .sleep
                .get_or_insert_with(|| Box::pin(tokio::time::sleep(delay)));
            ready!(sleep.as_mut().poll(cx));
            self.sleep = None;
            self.buf.lock().unwrap().extend_from_slice(data);
            Poll::Ready(Ok(data.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_full_alive_channel_loses_nothing_on_cancel() {
        let (tx, rx) = mpsc::channel(128);
        for i in 0..100 {
            tx.send(format!("http://host{i}.test/")).await.unwrap();
        }
        drop(tx);

        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = SlowWriter {
            buf: Arc::clone(&buf),
            delay: Duration::from_millis(20),
            sleep: None,
        };
        // One-byte buffer: every line reaches the slow writer.
        let sink = ResultSink::with_capacity(1, writer);

        let workers: Vec<Arc<dyn Prober>> = (0..4)
            .map(|_| Arc::new(StubProber) as Arc<dyn Prober>)
            .collect();
        let pipeline =
            Pipeline::new(config().with_queue_capacity(1), Arc::new(ProxyPool::new())).unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            pipeline.run_with_probers(rx, workers, sink, &cancel),
        )
        .await
        .expect("pipeline did not stop on cancellation");

        let report = match result {
            Err(PipelineError::Cancelled(report)) => report,
            other => panic!("expected cancellation, got {other:?}"),
        };
        assert!(report.alive > 0);
        assert!(report.alive < 100);
        assert_eq!(report.alive, report.written);

        let out = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        let lines: HashSet<_> = out.lines().collect();
        assert_eq!(lines.len() as u64, report.alive);
        assert!(lines.iter().all(|l| l.starts_with("http://host")));
    }
}
