//! Reconnecting live-update client

use super::backoff::Backoff;
use super::messages::{ClientMessage, LiveEvent};
use super::LiveEventSink;
use crate::config::SocketConfig;
use crate::notify::Notifier;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const CONNECTION_LOST_MESSAGE: &str = "Websocket connection lost. Attempting to reconnect...";
pub const RECONNECTED_MESSAGE: &str = "Websocket reconnected";

const EVENT_CHANNEL_CAPACITY: usize = 256;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection state of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected, and not trying to be
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Open and receiving events
    Connected,
    /// Lost the connection; waiting out the backoff delay
    Reconnecting,
}

/// How a connected session ended
#[derive(Debug)]
enum Closed {
    /// Local teardown or a normal close frame from the server
    Clean,
    Lost(String),
}

struct ClientInner {
    url: String,
    config: SocketConfig,
    notifier: Notifier,
    sink: Arc<dyn LiveEventSink>,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<LiveEvent>,
    lost_toast: Mutex<Option<Uuid>>,
    next_generation: AtomicU64,
    task: Mutex<Option<Task>>,
}

/// The running connection task, tagged so a finished run only clears its own slot
struct Task {
    generation: u64,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Live-update socket client
///
/// Holds at most one connection. Unexpected closes are retried forever with
/// exponential backoff; a clean close ends the connection for good. This
/// struct is cheaply cloneable as it uses an internal Arc.
#[derive(Clone)]
pub struct SocketClient {
    inner: Arc<ClientInner>,
}

impl SocketClient {
    pub fn new(
        url: impl Into<String>,
        config: SocketConfig,
        notifier: Notifier,
        sink: Arc<dyn LiveEventSink>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(ClientInner {
                url: url.into(),
                config,
                notifier,
                sink,
                state,
                events,
                lost_toast: Mutex::new(None),
                next_generation: AtomicU64::new(0),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Every dispatched event, after the sink has applied it
    pub fn events(&self) -> broadcast::Receiver<LiveEvent> {
        self.inner.events.subscribe()
    }

    /// Start the connection task
    ///
    /// A call while a connection is open or being retried is ignored.
    pub fn connect(&self) {
        let mut task = self.inner.task.lock();
        if task.is_some() {
            debug!(state = ?self.connection_state(), "ignoring duplicate connect");
            return;
        }

        self.inner.set_state(ConnectionState::Connecting);

        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run(self.inner.clone(), shutdown.clone(), generation));
        *task = Some(Task {
            generation,
            shutdown,
            handle,
        });
    }

    /// Close the connection and stop reconnecting
    pub async fn disconnect(&self) {
        let task = self.inner.task.lock().take();
        if let Some(Task { shutdown, handle, .. }) = task {
            shutdown.cancel();
            if let Err(e) = handle.await {
                warn!(error = %e, "socket task ended abnormally");
            }
        }

        self.inner.dismiss_lost_toast();
        self.inner.set_state(ConnectionState::Disconnected);
    }
}

impl ClientInner {
    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    /// Free the task slot and go idle if `generation` still owns it
    fn release(&self, generation: u64) -> bool {
        let mut task = self.task.lock();
        match task.as_ref() {
            Some(current) if current.generation == generation => {
                task.take();
                self.set_state(ConnectionState::Disconnected);
                true
            }
            _ => false,
        }
    }

    fn dismiss_lost_toast(&self) {
        if let Some(id) = self.lost_toast.lock().take() {
            self.notifier.dismiss(id);
        }
    }

    fn on_open(&self, was_reconnecting: bool) {
        info!(url = %self.url, "websocket connection opened");
        self.dismiss_lost_toast();
        if was_reconnecting {
            self.notifier.success(RECONNECTED_MESSAGE);
        }
        self.set_state(ConnectionState::Connected);
    }

    /// First unexpected close of a streak: one persistent toast
    fn on_lost(&self) {
        let mut lost = self.lost_toast.lock();
        if lost.is_none() {
            *lost = Some(self.notifier.persistent_error(CONNECTION_LOST_MESSAGE));
        }
    }

    fn handle_text(&self, text: &str) {
        match LiveEvent::parse(text) {
            Ok(Some(event)) => {
                debug!(kind = event.kind(), server_id = event.server_id(), "live event");
                self.sink.handle(&event);
                let _ = self.events.send(event);
            }
            Ok(None) => debug!("ignoring unhandled socket message"),
            Err(e) => warn!(error = %e, "dropping malformed socket message"),
        }
    }

    async fn open(&self) -> Result<WsStream, String> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| e.to_string())?;

        if let Some(cookie) = &self.config.session_cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| e.to_string())?;
            request.headers_mut().insert(COOKIE, value);
        }

        match timeout(self.config.connect_timeout, connect_async(request)).await {
            Ok(Ok((stream, _))) => Ok(stream),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err("connect timed out".to_string()),
        }
    }
}

/// Connect, serve, and reconnect until shut down or closed cleanly
async fn run(inner: Arc<ClientInner>, shutdown: CancellationToken, generation: u64) {
    let mut backoff = Backoff::from_config(&inner.config);
    let mut reconnecting = false;

    loop {
        let opened = tokio::select! {
            _ = shutdown.cancelled() => break,
            opened = inner.open() => opened,
        };

        match opened {
            Ok(stream) => {
                backoff.reset();
                inner.on_open(reconnecting);
                reconnecting = false;

                match session(&inner, stream, &shutdown).await {
                    Closed::Clean => {
                        info!("websocket connection closed");
                        break;
                    }
                    Closed::Lost(reason) => warn!(%reason, "websocket connection lost"),
                }
            }
            Err(e) => warn!(error = %e, url = %inner.url, "websocket connect failed"),
        }

        if shutdown.is_cancelled() {
            break;
        }

        if !inner.config.auto_reconnect {
            inner.notifier.error("Websocket connection lost");
            break;
        }

        if !reconnecting {
            reconnecting = true;
            inner.on_lost();
        }
        inner.set_state(ConnectionState::Reconnecting);

        let delay = backoff.next_delay();
        info!(?delay, "reconnecting");
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        inner.set_state(ConnectionState::Connecting);
    }

    // disconnect() has already emptied the slot when cancelled; a newer
    // connect() may own it by now, in which case its state is left alone.
    if shutdown.is_cancelled() {
        return;
    }
    inner.release(generation);
}

/// Serve one open connection until it closes
async fn session(inner: &Arc<ClientInner>, stream: WsStream, shutdown: &CancellationToken) -> Closed {
    let (mut write, mut read) = stream.split();
    let (tx, mut rx) = mpsc::channel::<ClientMessage>(16);

    // Spawn ping task
    let ping_interval = inner.config.ping_interval;
    let ping_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);
        loop {
            interval.tick().await;
            if tx.send(ClientMessage::ping()).await.is_err() {
                break;
            }
        }
    });

    let closed = loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                break Closed::Clean;
            }

            msg = rx.recv() => {
                let Some(msg) = msg else {
                    break Closed::Lost("keepalive stopped".to_string());
                };
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "failed to encode socket message");
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(text)).await {
                    break Closed::Lost(e.to_string());
                }
            }

            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => inner.handle_text(&text),
                    Some(Ok(Message::Close(frame))) => {
                        if is_clean_close(frame.as_ref()) {
                            break Closed::Clean;
                        }
                        break Closed::Lost(format!("closed by server: {:?}", frame));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Closed::Lost(e.to_string()),
                    None => break Closed::Lost("stream ended".to_string()),
                }
            }
        }
    };

    ping_task.abort();
    closed
}

/// Normal and going-away closes are intentional; anything else is a failure
fn is_clean_close(frame: Option<&CloseFrame<'_>>) -> bool {
    matches!(
        frame.map(|f| f.code),
        Some(CloseCode::Normal) | Some(CloseCode::Away)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::time::Duration;

    struct NullSink;

    impl LiveEventSink for NullSink {
        fn handle(&self, _event: &LiveEvent) {}
    }

    fn client() -> SocketClient {
        SocketClient::new(
            "ws://127.0.0.1:9/ws",
            SocketConfig::default().no_reconnect(),
            Notifier::new(),
            Arc::new(NullSink),
        )
    }

    #[test]
    fn test_client_initial_state() {
        let client = client();
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert_eq!(*client.state_receiver().borrow(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_clean_close_codes() {
        let frame = |code| CloseFrame {
            code,
            reason: Cow::Borrowed(""),
        };

        assert!(is_clean_close(Some(&frame(CloseCode::Normal))));
        assert!(is_clean_close(Some(&frame(CloseCode::Away))));
        assert!(!is_clean_close(Some(&frame(CloseCode::Error))));
        assert!(!is_clean_close(Some(&frame(CloseCode::Abnormal))));
        assert!(!is_clean_close(None));
    }

    #[tokio::test]
    async fn test_disconnect_when_idle() {
        let client = client();
        client.disconnect().await;
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_failed_connect_without_reconnect() {
        let client = client();
        let mut state = client.state_receiver();

        client.connect();
        tokio::time::timeout(
            Duration::from_secs(5),
            state.wait_for(|s| *s == ConnectionState::Disconnected),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(client.inner.notifier.was_shown("Websocket connection lost"));
    }

    #[tokio::test]
    async fn test_finished_run_keeps_newer_task() {
        let client = client();
        let newer = Task {
            generation: 1,
            shutdown: CancellationToken::new(),
            handle: tokio::spawn(async {}),
        };
        *client.inner.task.lock() = Some(newer);

        client.inner.set_state(ConnectionState::Connecting);

        assert!(!client.inner.release(0));
        assert!(client.inner.task.lock().is_some());
        assert_eq!(client.connection_state(), ConnectionState::Connecting);

        assert!(client.inner.release(1));
        assert!(client.inner.task.lock().is_none());
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }
}
