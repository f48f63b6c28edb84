//! Realtime events for the file-backed store.
//!
//! Tails `events.jsonl` from its current end. A filesystem watcher reacts
//! to appends promptly and a 500ms poll catches anything the watcher
//! misses (network filesystems, editors that replace the file).

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use lazylist_core::error::{Error, InvalidInputError};
use lazylist_core::{EventSource, ItemSchema, ListEvent, Result};

use crate::store::{FileStore, LogEntry, map_io};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Realtime source backed by a store's event log.
#[derive(Debug, Clone)]
pub struct FileEventSource {
    store: FileStore,
}

impl FileEventSource {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }
}

impl EventSource for FileEventSource {
    type Stream = FileEventStream;

    /// Start tailing the log. Must be called inside a tokio runtime.
    fn subscribe(&self) -> Result<FileEventStream> {
        FileEventStream::tail(&self.store)
    }
}

/// Events appended to the log after the subscription started.
pub struct FileEventStream {
    inner: Pin<Box<dyn Stream<Item = Result<ListEvent>> + Send>>,
}

impl FileEventStream {
    fn tail(store: &FileStore) -> Result<Self> {
        let root = store.root().to_path_buf();
        let log_path = store.events_path();
        let schema = store.schema().clone();

        std::fs::create_dir_all(&root).map_err(map_io)?;

        let (tx, mut rx) = mpsc::unbounded_channel::<Result<ListEvent>>();

        let initial_pos = std::fs::metadata(&log_path).map(|m| m.len()).unwrap_or(0);
        let tail = Arc::new(Tail {
            path: log_path,
            schema,
            position: Mutex::new(initial_pos),
        });

        let watch_tail = tail.clone();
        let watch_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else { return };
            if !matches!(
                event.kind,
                notify::EventKind::Modify(_) | notify::EventKind::Create(_)
            ) {
                return;
            }
            if event.paths.iter().any(|p| watch_tail.is_log(p)) {
                watch_tail.read_new(&watch_tx);
            }
        })
        .map_err(|e| watcher_error("create file watcher", e))?;

        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .map_err(|e| watcher_error("watch directory", e))?;

        tokio::spawn(async move {
            let _watcher = watcher;
            let mut interval = tokio::time::interval(POLL_INTERVAL);

            loop {
                interval.tick().await;
                if tx.is_closed() {
                    debug!("event log subscriber gone, stopping tail");
                    break;
                }
                tail.read_new(&tx);
            }
        });

        let stream = async_stream::stream! {
            while let Some(event) = rx.recv().await {
                yield event;
            }
        };

        Ok(Self {
            inner: Box::pin(stream),
        })
    }
}

impl Stream for FileEventStream {
    type Item = Result<ListEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

struct Tail {
    path: PathBuf,
    schema: ItemSchema,
    position: Mutex<u64>,
}

impl Tail {
    fn is_log(&self, path: &Path) -> bool {
        path.file_name() == self.path.file_name()
    }

    /// Forward complete lines past the saved position.
    fn read_new(&self, tx: &mpsc::UnboundedSender<Result<ListEvent>>) {
        let Ok(mut file) = File::open(&self.path) else {
            return;
        };
        let mut pos = self.position.lock().unwrap_or_else(|e| e.into_inner());

        // The log was truncated or replaced.
        if file.metadata().is_ok_and(|m| m.len() < *pos) {
            *pos = 0;
        }
        if file.seek(SeekFrom::Start(*pos)).is_err() {
            return;
        }

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                // A writer is mid-line; pick it up next time.
                Ok(_) if buf.last() != Some(&b'\n') => break,
                Ok(n) => *pos += n as u64,
                Err(e) => {
                    warn!(error = %e, "failed to read event log");
                    break;
                }
            }

            let Ok(line) = std::str::from_utf8(&buf) else {
                warn!(offset = *pos, "skipping non UTF-8 event log line");
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Some(event) = self.parse_line(line) {
                let _ = tx.send(Ok(event));
            }
        }
    }

    fn parse_line(&self, line: &str) -> Option<ListEvent> {
        let entry = match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping malformed event log line");
                return None;
            }
        };
        match self.schema.parse_event(entry.event) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(seq = %entry.seq, error = %e, "skipping unparseable event");
                None
            }
        }
    }
}

fn watcher_error(action: &str, err: notify::Error) -> Error {
    Error::InvalidInput(InvalidInputError::Other {
        message: format!("Failed to {}: {}", action, err),
    })
}
