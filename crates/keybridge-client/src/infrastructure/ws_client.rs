//! WebSocket client: connection loop, reconnects, and frame I/O.
//!
//! [`run_client`] owns the [`KeyboardSession`] for the lifetime of the
//! process.  For each connection it:
//!
//! 1. Opens a WebSocket to `config.server_url`.
//! 2. Splits it; the sink goes to a writer task fed by an unbounded channel
//!    that [`ChannelTransport`] pushes into, so frames leave in send order.
//! 3. `select!`s over inbound frames, local input events, and a 200 ms tick
//!    that checks the shutdown flag.  Every event reaches the session from
//!    this one task.
//! 4. On close or error, detaches the transport, reports the disconnect, and
//!    retries after `config.reconnect_interval`.
//!
//! Input that arrives while disconnected is dispatched to the (disconnected)
//! session, which ignores key and paste events; nothing is buffered.
//!
//! # Exit conditions
//!
//! - The shutdown flag is cleared (Ctrl+C).
//! - The input channel is closed and every tracked keystroke has been
//!   acknowledged, or `config.ack_timeout` has passed since input closed.

use std::fmt::Display;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use keybridge_core::{InboundMessage, OutboundMessage};

use crate::application::ports::{Transport, TransportError};
use crate::application::{KeyboardSession, SessionEvent};
use crate::domain::ClientConfig;
use crate::infrastructure::log_history::LogHistory;

/// How often the connection loop checks the shutdown flag.
const TICK: Duration = Duration::from_millis(200);

// ── Transport ─────────────────────────────────────────────────────────────────

/// [`Transport`] that hands messages to the current connection's writer task.
#[derive(Debug, Default)]
pub struct ChannelTransport {
    tx: Option<UnboundedSender<OutboundMessage>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes subsequent sends to a new connection.
    pub fn attach(&mut self, tx: UnboundedSender<OutboundMessage>) {
        self.tx = Some(tx);
    }

    /// Drops the sender; the writer task drains what is queued and closes.
    pub fn detach(&mut self) {
        self.tx = None;
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, message: OutboundMessage) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::NotConnected)?;
        tx.send(message)
            .map_err(|e| TransportError::Send(format!("writer task gone ({})", e.0.event_name())))
    }
}

// ── Client loop ───────────────────────────────────────────────────────────────

/// Totals reported when the client loop exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: u64,
    pub failed: u64,
    /// Tracked keystrokes that never got an acknowledgment, whether still
    /// pending or abandoned when their connection dropped.
    pub unacknowledged: usize,
}

/// Why a connection ended.
#[derive(Debug)]
enum ConnectionEnd {
    /// The link dropped; reconnect.
    Lost(String),
    /// The client is done; do not reconnect.
    Finished(String),
}

type Session = KeyboardSession<ChannelTransport, LogHistory>;

/// Input-side state that survives reconnects.
struct InputState {
    rx: UnboundedReceiver<SessionEvent>,
    open: bool,
    /// Set when input closes; pending acks are abandoned after this.
    deadline: Option<Instant>,
    ack_timeout: Duration,
}

impl InputState {
    fn on_event(&mut self, session: &mut Session, event: Option<SessionEvent>) {
        match event {
            Some(event) => {
                session.dispatch(event);
            }
            None => {
                debug!(pending = session.pending_len(), "input closed");
                self.open = false;
                self.deadline = Some(Instant::now() + self.ack_timeout);
            }
        }
    }

    /// Input is finished and nothing more is worth waiting for.
    fn is_done(&self, session: &Session) -> bool {
        if self.open {
            return false;
        }
        if session.pending_len() == 0 {
            return true;
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(
                pending = session.pending_len(),
                "timed out waiting for acknowledgments"
            );
            return true;
        }
        false
    }
}

/// Runs the client until shutdown or until input is exhausted.
///
/// # Errors
///
/// Currently infallible past startup: connection failures are logged and
/// retried.  The `Result` leaves room for fatal setup errors.
pub async fn run_client(
    config: ClientConfig,
    input: UnboundedReceiver<SessionEvent>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<RunSummary> {
    let mut session = KeyboardSession::from_config(&config, ChannelTransport::new(), LogHistory::new());
    let mut input = InputState {
        rx: input,
        open: true,
        deadline: None,
        ack_timeout: config.ack_timeout,
    };

    while running.load(Ordering::Relaxed) && !input.is_done(&session) {
        match connect_async(config.server_url.as_str()).await {
            Ok((ws_stream, _response)) => {
                let conn_id = Uuid::new_v4();
                info!(%conn_id, url = %config.server_url, "WebSocket connected");

                let (sink, stream) = ws_stream.split();
                let (out_tx, out_rx) = mpsc::unbounded_channel();
                let writer = tokio::spawn(write_frames(sink, out_rx, conn_id));

                session.transport_mut().attach(out_tx);
                session.dispatch(SessionEvent::Connected);

                let end = drive_connection(&mut session, stream, &mut input, &running, conn_id).await;

                session.transport_mut().detach();
                if let Err(e) = writer.await {
                    error!(%conn_id, "writer task panicked: {e}");
                }

                match end {
                    ConnectionEnd::Lost(reason) => {
                        session.dispatch(SessionEvent::Disconnected { reason });
                    }
                    ConnectionEnd::Finished(reason) => {
                        session.dispatch(SessionEvent::Disconnected { reason });
                        break;
                    }
                }
            }
            Err(e) => warn!(url = %config.server_url, "could not connect: {e}"),
        }

        wait_before_reconnect(&mut session, &mut input, &running, config.reconnect_interval).await;
    }

    let summary = RunSummary {
        succeeded: session.history().succeeded(),
        failed: session.history().failed(),
        unacknowledged: session.pending_len() + session.abandoned_len(),
    };
    info!(?summary, "client stopped");
    Ok(summary)
}

/// Processes one connection until it ends.
async fn drive_connection<S>(
    session: &mut Session,
    mut stream: S,
    input: &mut InputState,
    running: &AtomicBool,
    conn_id: Uuid,
) -> ConnectionEnd
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    let mut tick = interval(TICK);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => on_text_frame(session, &text, conn_id),
                Some(Ok(WsMessage::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "closed by service".to_string());
                    return ConnectionEnd::Lost(reason);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return ConnectionEnd::Lost(e.to_string()),
                None => return ConnectionEnd::Lost("connection closed".to_string()),
            },
            event = input.rx.recv(), if input.open => input.on_event(session, event),
            _ = tick.tick() => {}
        }

        if !running.load(Ordering::Relaxed) {
            info!(%conn_id, "shutdown requested; closing connection");
            session.request_shutdown();
            return ConnectionEnd::Finished("shutdown requested".to_string());
        }
        if input.is_done(session) {
            session.request_shutdown();
            return ConnectionEnd::Finished("input finished".to_string());
        }
    }
}

fn on_text_frame(session: &mut Session, text: &str, conn_id: Uuid) {
    match InboundMessage::from_json(text) {
        Ok(InboundMessage::KeystrokeReceived(ack)) => {
            session.dispatch(SessionEvent::Acknowledged(ack));
        }
        Err(e) => warn!(%conn_id, "ignoring inbound frame: {e}"),
    }
}

/// Serializes queued messages onto the socket, then closes it.
async fn write_frames<S>(mut sink: S, mut rx: UnboundedReceiver<OutboundMessage>, conn_id: Uuid)
where
    S: Sink<WsMessage> + Unpin,
    S::Error: Display,
{
    while let Some(message) = rx.recv().await {
        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                error!(%conn_id, "could not encode {}: {e}", message.event_name());
                continue;
            }
        };
        if let Err(e) = sink.send(WsMessage::Text(text)).await {
            debug!(%conn_id, "WebSocket send failed: {e}");
            break;
        }
    }
    if let Err(e) = sink.close().await {
        debug!(%conn_id, "WebSocket close failed: {e}");
    }
}

/// Sleeps for `delay`, dispatching (and so discarding) input meanwhile.
async fn wait_before_reconnect(
    session: &mut Session,
    input: &mut InputState,
    running: &AtomicBool,
    delay: Duration,
) {
    let wake = sleep(delay);
    tokio::pin!(wake);
    let mut tick = interval(TICK);

    loop {
        tokio::select! {
            _ = &mut wake => return,
            event = input.rx.recv(), if input.open => input.on_event(session, event),
            _ = tick.tick() => {}
        }
        if !running.load(Ordering::Relaxed) || input.is_done(session) {
            return;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
