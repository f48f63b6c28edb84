//! WebSocket realtime source.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{SinkExt, Stream, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace, warn};

use lazylist_core::error::{Error, TransportError};
use lazylist_core::{EventSource, ItemSchema, ListEvent, RawListEvent, Result, SourceUrl};

/// Realtime patches delivered over a WebSocket.
///
/// Each text frame carries `{"type": "created" | "updated" | "deleted",
/// "payload": ...}`. Frames that do not parse are logged and skipped; the
/// stream ends when the server closes the socket.
#[derive(Debug, Clone)]
pub struct WsEventSource {
    url: String,
    schema: ItemSchema,
}

impl WsEventSource {
    /// Listen on `{base as ws(s)}/{path}`.
    pub fn new(base: &SourceUrl, path: &str, schema: ItemSchema) -> Self {
        Self {
            url: base.ws_url(path),
            schema,
        }
    }

    /// The WebSocket URL connected to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EventSource for WsEventSource {
    type Stream = WsEventStream;

    fn subscribe(&self) -> Result<Self::Stream> {
        Ok(WsEventStream::connect(self.url.clone(), self.schema.clone()))
    }
}

/// Stream of patches from a [`WsEventSource`].
///
/// The connection is opened on first poll.
pub struct WsEventStream {
    inner: Pin<Box<dyn Stream<Item = Result<ListEvent>> + Send>>,
}

impl WsEventStream {
    fn connect(url: String, schema: ItemSchema) -> Self {
        let stream = async_stream::stream! {
            info!(url = %url, "connecting to realtime events");
            let ws_stream = match connect_async(url.as_str()).await {
                Ok((ws_stream, _)) => ws_stream,
                Err(e) => {
                    error!(error = %e, "realtime connection failed");
                    yield Err(Error::Transport(TransportError::Connection {
                        message: e.to_string(),
                    }));
                    return;
                }
            };
            debug!("WebSocket connected, listening for events");

            let (mut write, mut read) = ws_stream.split();
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if let Some(event) = parse_frame(&schema, text.as_str()) {
                            yield Ok(event);
                        }
                    }
                    Ok(Message::Binary(data)) => {
                        match std::str::from_utf8(&data) {
                            Ok(text) => {
                                if let Some(event) = parse_frame(&schema, text) {
                                    yield Ok(event);
                                }
                            }
                            Err(_) => warn!(len = data.len(), "skipping non-UTF-8 binary frame"),
                        }
                    }
                    Ok(Message::Ping(data)) => {
                        trace!("Received ping");
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            warn!(error = %e, "Failed to send pong");
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        info!(?frame, "WebSocket closed by server");
                        break;
                    }
                    Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                    Err(e) => {
                        error!(error = %e, "WebSocket error");
                        yield Err(Error::Transport(TransportError::Connection {
                            message: e.to_string(),
                        }));
                        break;
                    }
                }
            }
        };

        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for WsEventStream {
    type Item = Result<ListEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for WsEventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsEventStream").finish_non_exhaustive()
    }
}

fn parse_frame(schema: &ItemSchema, text: &str) -> Option<ListEvent> {
    let raw: RawListEvent = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "skipping unparseable realtime frame");
            return None;
        }
    };
    match schema.parse_event(raw) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "skipping realtime frame with bad payload");
            None
        }
    }
}
