//! Background preview worker
//!
//! One thread serves all preview requests. Requests carry a monotonically
//! increasing id; the id of the newest request is shared with the worker through
//! an atomic. A request whose id is no longer the newest is stale: the worker
//! skips it if still queued and stops reading it between lines if already started.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{PreviewError, SourceError};
use crate::export::SessionSource;
use crate::parsers::{DecodeOptions, ReadControl, read_transcript_until};

use super::projection::{Preview, PreviewOptions, project};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub id: u64,
    pub path: PathBuf,
}

/// Answer to one request; only meaningful while `id` is still current
#[derive(Debug)]
pub struct PreviewResult {
    pub id: u64,
    pub path: PathBuf,
    pub outcome: Result<Preview, PreviewError>,
}

/// Builds a bounded preview, or `None` if `is_stale` reported supersession
pub fn build_preview(
    source: &dyn SessionSource,
    request: &PreviewRequest,
    options: &PreviewOptions,
    is_stale: &dyn Fn() -> bool,
) -> Option<Result<Preview, PreviewError>> {
    let reader = match source.open(&request.path) {
        Ok(reader) => reader,
        Err(e) => return Some(Err(e.into())),
    };

    let mut cancelled = false;
    let read = read_transcript_until(reader, &DecodeOptions::default(), |builder, lines| {
        if is_stale() {
            cancelled = true;
            return ReadControl::Stop;
        }
        // One node past the limit means the first `max_nodes` are complete
        if builder.top_level_len() > options.max_nodes || lines >= options.max_lines {
            ReadControl::Stop
        } else {
            ReadControl::Continue
        }
    });
    if cancelled {
        debug!(id = request.id, "preview superseded mid-read");
        return None;
    }

    let transcript = match read {
        Ok(transcript) => transcript,
        Err(source) => {
            return Some(Err(SourceError::Io { path: request.path.clone(), source }.into()));
        }
    };
    if transcript.document.is_empty() {
        return Some(Err(PreviewError::Empty));
    }

    let mut preview =
        project(&transcript.document, &transcript.meta, transcript.anomalies.len(), options);
    preview.truncated |= transcript.stopped_early;
    Some(Ok(preview))
}

/// Worker loop: serves requests until the request channel closes.
pub fn worker_loop(
    request_rx: Receiver<PreviewRequest>,
    result_tx: Sender<PreviewResult>,
    latest: Arc<AtomicU64>,
    source: Arc<dyn SessionSource>,
    options: PreviewOptions,
) {
    while let Ok(mut request) = request_rx.recv() {
        // Only the newest queued request matters
        while let Ok(newer) = request_rx.try_recv() {
            request = newer;
        }
        if request.id != latest.load(Ordering::Acquire) {
            continue;
        }

        let id = request.id;
        let is_stale = || latest.load(Ordering::Acquire) != id;
        let Some(outcome) = build_preview(source.as_ref(), &request, &options, &is_stale) else {
            continue;
        };
        if is_stale() {
            continue;
        }
        // Ignore send errors (the browser may have exited)
        let _ = result_tx.send(PreviewResult { id, path: request.path, outcome });
    }
}

/// Handle to the preview worker, owned by the browser's input loop
pub struct PreviewService {
    request_tx: Option<Sender<PreviewRequest>>,
    result_rx: Receiver<PreviewResult>,
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl PreviewService {
    pub fn spawn(source: Arc<dyn SessionSource>, options: PreviewOptions) -> Self {
        let (request_tx, request_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(0));

        let worker_latest = Arc::clone(&latest);
        let handle = thread::Builder::new()
            .name("preview-worker".to_string())
            .spawn(move || worker_loop(request_rx, result_tx, worker_latest, source, options))
            .map_err(|e| warn!(error = %e, "failed to start preview worker"))
            .ok();

        Self { request_tx: Some(request_tx), result_rx, latest, handle }
    }

    /// Schedules a preview of `path`, superseding any earlier request
    pub fn request(&self, path: PathBuf) -> u64 {
        let id = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(tx) = &self.request_tx
            && tx.send(PreviewRequest { id, path }).is_err()
        {
            warn!(id, "preview worker is gone");
        }
        id
    }

    /// Makes every outstanding request stale without issuing a new one
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }

    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Next result for the current request, if one is ready. Stale results are dropped.
    pub fn try_recv(&self) -> Option<PreviewResult> {
        while let Ok(result) = self.result_rx.try_recv() {
            if result.id == self.current() {
                return Some(result);
            }
        }
        None
    }

    /// Blocking variant of [`Self::try_recv`]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PreviewResult> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok(result) if result.id == self.current() => return Some(result),
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

impl Drop for PreviewService {
    fn drop(&mut self) {
        self.cancel();
        // Closing the channel ends the worker loop
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, BufRead, Read};
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::export::MemorySource;

    const LOG: &str = r#"{"kind":"user_message","content":"first"}
{"kind":"assistant_message","content":"second"}
"#;

    fn service(source: MemorySource) -> PreviewService {
        PreviewService::spawn(Arc::new(source), PreviewOptions::default())
    }

    #[test]
    fn test_preview_result_for_current_request() {
        let previews = service(MemorySource::new().with_log("/a.jsonl", LOG));
        let id = previews.request(PathBuf::from("/a.jsonl"));

        let result = previews.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.id, id);
        let preview = result.outcome.unwrap();
        assert_eq!(preview.entries.len(), 2);
        assert_eq!(preview.entries[0].text, "first");
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let source = MemorySource::new()
            .with_log("/a.jsonl", LOG)
            .with_log("/b.jsonl", r#"{"kind":"user_message","content":"from b"}"#);
        let previews = service(source);

        previews.request(PathBuf::from("/a.jsonl"));
        let b = previews.request(PathBuf::from("/b.jsonl"));

        let result = previews.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.id, b);
        assert_eq!(result.path, PathBuf::from("/b.jsonl"));
        assert_eq!(result.outcome.unwrap().entries[0].text, "from b");
        assert!(previews.try_recv().is_none());
    }

    #[test]
    fn test_missing_session_is_an_error_outcome() {
        let previews = service(MemorySource::new());
        previews.request(PathBuf::from("/missing.jsonl"));

        let result = previews.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result.outcome, Err(PreviewError::Source(SourceError::NotFound(_)))));
    }

    #[test]
    fn test_empty_session_is_an_error_outcome() {
        let previews = service(MemorySource::new().with_log("/e.jsonl", "garbage\n"));
        previews.request(PathBuf::from("/e.jsonl"));

        let result = previews.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result.outcome, Err(PreviewError::Empty)));
    }

    #[test]
    fn test_cancel_discards_in_flight_result() {
        let previews = service(MemorySource::new().with_log("/a.jsonl", LOG));
        previews.request(PathBuf::from("/a.jsonl"));
        previews.cancel();

        assert!(previews.recv_timeout(Duration::from_millis(200)).is_none());
    }

    /// Endless log of non-conversation lines that counts how many were pulled
    struct Endless {
        served: Arc<AtomicUsize>,
        line: &'static [u8],
        pos: usize,
    }

    impl Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = {
                let chunk = self.fill_buf()?;
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                n
            };
            self.consume(n);
            Ok(n)
        }
    }

    impl BufRead for Endless {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            Ok(&self.line[self.pos..])
        }

        fn consume(&mut self, amt: usize) {
            self.pos += amt;
            if self.pos >= self.line.len() {
                self.pos = 0;
                self.served.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    struct EndlessSource(Arc<AtomicUsize>);

    impl SessionSource for EndlessSource {
        fn open(&self, _: &Path) -> Result<Box<dyn BufRead + Send>, SourceError> {
            Ok(Box::new(Endless {
                served: Arc::clone(&self.0),
                line: b"{\"type\":\"summary\",\"summary\":\"...\"}\n",
                pos: 0,
            }))
        }
    }

    #[test]
    fn test_stale_request_stops_between_lines() {
        let served = Arc::new(AtomicUsize::new(0));
        let source = EndlessSource(Arc::clone(&served));
        let request = PreviewRequest { id: 1, path: PathBuf::from("/endless.jsonl") };
        let options = PreviewOptions { max_lines: usize::MAX, ..Default::default() };

        let checks = AtomicUsize::new(0);
        let is_stale = || checks.fetch_add(1, Ordering::SeqCst) >= 10;
        let outcome = build_preview(&source, &request, &options, &is_stale);

        assert!(outcome.is_none());
        assert_eq!(served.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_preview_stops_after_enough_nodes() {
        let log = "{\"kind\":\"user_message\",\"content\":\"x\"}\n".repeat(50);
        let source = MemorySource::new().with_log("/long.jsonl", log);
        let request = PreviewRequest { id: 1, path: PathBuf::from("/long.jsonl") };

        let preview = build_preview(&source, &request, &PreviewOptions::default(), &|| false)
            .unwrap()
            .unwrap();
        assert_eq!(preview.entries.len(), 4);
        assert!(preview.truncated);
    }
}
