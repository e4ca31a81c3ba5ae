//! KeyboardSession: the single owner of all per-connection keyboard state.
//!
//! A session holds the modifier state, the acknowledgment correlator, and
//! the connection tracker, and handles one [`SessionEvent`] at a time.  Every
//! handler takes `&mut self`, so events are processed strictly in arrival
//! order with no locking; the async client runs a session inside one task.
//!
//! # Event flow
//!
//! ```text
//! KeyDown ─► normalizer ─┐
//!                        ├─► register id ─► HistoryView::register_pending
//! Paste ───► decomposer ─┘         │
//!                                  └──────► Transport::send(keystroke)
//!
//! Acknowledged ─► correlator ─► HistoryView::resolve_pending
//! Disconnected ─► correlator ─► HistoryView::abandon_pending
//! ```
//!
//! Anomalies (an acknowledgment with nothing pending, a failed send) are
//! logged and never stop later events from being processed.

use keybridge_core::{
    AckCorrelator, ConnectionTracker, DisconnectOutcome, KeyboardLayout, KeystrokeAck,
    KeystrokeFrame, KeystrokeMessage, Modifier, ModifierState, OutboundMessage, SequenceId,
};
use tracing::{debug, info, warn};

use crate::application::normalizer::{
    KeyDownDecision, KeyEventNormalizer, KeyUpDecision, RawKeyEvent,
};
use crate::application::paste::PasteDecomposer;
use crate::application::ports::{ErrorKind, HistoryView, Transport};
use crate::domain::ClientConfig;

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    KeyDown(RawKeyEvent),
    KeyUp(RawKeyEvent),
    Paste { text: String, show_history: bool },
    ToggleModifier(Modifier),
    Connected,
    Disconnected { reason: String },
    Acknowledged(KeystrokeAck),
    /// The user asked the remote machine to shut down; the disconnect that
    /// follows is expected.
    ShutdownRequested,
}

/// Result of handling one event, for the input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Nothing was sent.
    Ignored,
    /// One keystroke was sent.  `sequence_id` is `None` for an untracked
    /// meta chord; an input source with a local default action lets that
    /// one through and suppresses the rest.
    Forwarded { sequence_id: Option<SequenceId> },
    /// A `keyRelease` was sent.
    Released,
    /// A paste was decomposed into this many keystrokes.
    Pasted { sent: usize },
    /// State changed; nothing was sent.
    Handled,
}

/// One remote-keyboard session.
pub struct KeyboardSession<T: Transport, H: HistoryView> {
    transport: T,
    history: H,
    layout: KeyboardLayout,
    normalizer: KeyEventNormalizer,
    modifiers: ModifierState,
    correlator: AckCorrelator,
    connection: ConnectionTracker,
    abandoned: usize,
}

impl<T: Transport, H: HistoryView> KeyboardSession<T, H> {
    /// Creates a disconnected session.
    pub fn new(
        transport: T,
        history: H,
        layout: KeyboardLayout,
        normalizer: KeyEventNormalizer,
    ) -> Self {
        Self {
            transport,
            history,
            layout,
            normalizer,
            modifiers: ModifierState::new(),
            correlator: AckCorrelator::new(),
            connection: ConnectionTracker::new(),
            abandoned: 0,
        }
    }

    pub fn from_config(config: &ClientConfig, transport: T, history: H) -> Self {
        Self::new(
            transport,
            history,
            config.layout.clone(),
            KeyEventNormalizer::new(config.meta_chord_policy),
        )
    }

    /// Routes an event to its handler.
    pub fn dispatch(&mut self, event: SessionEvent) -> Disposition {
        match event {
            SessionEvent::KeyDown(ev) => self.key_down(&ev),
            SessionEvent::KeyUp(ev) => self.key_up(&ev),
            SessionEvent::Paste { text, show_history } => Disposition::Pasted {
                sent: self.paste(&text, show_history),
            },
            SessionEvent::ToggleModifier(m) => {
                self.toggle_modifier(m);
                Disposition::Handled
            }
            SessionEvent::Connected => {
                self.on_connect();
                Disposition::Handled
            }
            SessionEvent::Disconnected { reason } => {
                self.on_disconnect(&reason);
                Disposition::Handled
            }
            SessionEvent::Acknowledged(ack) => {
                self.on_acknowledgment(ack);
                Disposition::Handled
            }
            SessionEvent::ShutdownRequested => {
                self.request_shutdown();
                Disposition::Handled
            }
        }
    }

    pub fn key_down(&mut self, event: &RawKeyEvent) -> Disposition {
        let decision =
            self.normalizer
                .key_down(event, self.connection.is_connected(), &mut self.modifiers);
        match decision {
            KeyDownDecision::Ignore => Disposition::Ignored,
            KeyDownDecision::Forward { keystroke, track } => Disposition::Forwarded {
                sequence_id: self.emit(keystroke, track, true),
            },
        }
    }

    pub fn key_up(&mut self, event: &RawKeyEvent) -> Disposition {
        let decision =
            self.normalizer
                .key_up(event, self.connection.is_connected(), &mut self.modifiers);
        match decision {
            KeyUpDecision::Nothing => Disposition::Ignored,
            KeyUpDecision::ReleaseModifiers => {
                self.send(OutboundMessage::KeyRelease);
                Disposition::Released
            }
        }
    }

    /// Types `text` on the remote machine.  Returns the number of keystrokes
    /// sent (zero while disconnected).
    pub fn paste(&mut self, text: &str, show_history: bool) -> usize {
        if !self.connection.is_connected() {
            debug!(chars = text.chars().count(), "paste ignored while disconnected");
            return 0;
        }
        let keystrokes =
            PasteDecomposer::new(&self.layout).decompose(text, &mut self.modifiers.manual);
        let sent = keystrokes.len();
        for pk in keystrokes {
            self.emit(pk.keystroke, true, show_history);
        }
        debug!(chars = text.chars().count(), keystrokes = sent, "paste decomposed");
        sent
    }

    pub fn toggle_modifier(&mut self, modifier: Modifier) {
        self.modifiers.toggle(modifier);
        debug!(%modifier, active = self.modifiers.manual.snapshot().get(modifier), "manual modifier toggled");
    }

    pub fn on_connect(&mut self) {
        self.connection.on_connect();
        info!("connected to keyboard service");
        self.history.clear_error(ErrorKind::ConnectionLost);
        self.history.show_connection_status(true);
    }

    /// Marks the session disconnected and abandons every pending keystroke.
    /// Acknowledgments on the next connection only match keystrokes sent on it.
    pub fn on_disconnect(&mut self, reason: &str) {
        let outcome = self.connection.on_disconnect(reason);
        self.abandon_pending();
        self.history.show_connection_status(false);
        match outcome {
            DisconnectOutcome::Suppressed => {
                info!(reason, "disconnected after requested shutdown");
            }
            DisconnectOutcome::ConnectionLost(reason) => {
                warn!(%reason, "connection to keyboard service lost");
                self.history.show_error(ErrorKind::ConnectionLost, &reason);
            }
        }
    }

    pub fn on_acknowledgment(&mut self, ack: KeystrokeAck) {
        match self.correlator.acknowledge(ack) {
            Ok(resolved) => {
                debug!(
                    id = resolved.id,
                    success = resolved.success,
                    pending = self.correlator.pending_len(),
                    "keystroke acknowledged"
                );
                if resolved.has_card {
                    self.history.resolve_pending(resolved.id, resolved.success);
                }
            }
            Err(e) => warn!("ignoring acknowledgment: {e}"),
        }
    }

    pub fn request_shutdown(&mut self) {
        self.connection.request_shutdown();
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn pending_len(&self) -> usize {
        self.correlator.pending_len()
    }

    /// Tracked keystrokes dropped unacknowledged by disconnects so far.
    pub fn abandoned_len(&self) -> usize {
        self.abandoned
    }

    pub fn modifiers(&self) -> &ModifierState {
        &self.modifiers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Registers (when tracked) and sends one keystroke.
    fn emit(
        &mut self,
        keystroke: KeystrokeMessage,
        track: bool,
        show_card: bool,
    ) -> Option<SequenceId> {
        let id = track.then(|| {
            let label = show_card.then(|| keystroke.display_label());
            let id = self.correlator.register(label.clone());
            if let Some(label) = label {
                self.history.register_pending(id, &label);
            }
            id
        });
        debug!(key = %keystroke.key, key_code = ?keystroke.key_code, ?id, "sending keystroke");
        self.send(OutboundMessage::Keystroke(KeystrokeFrame { keystroke, id }));
        id
    }

    fn abandon_pending(&mut self) {
        let abandoned = self.correlator.abandon_all();
        if abandoned.is_empty() {
            return;
        }
        warn!(count = abandoned.len(), "abandoning unacknowledged keystrokes");
        self.abandoned += abandoned.len();
        for entry in abandoned.into_iter().filter(|a| a.has_card) {
            self.history.abandon_pending(entry.id);
        }
    }

    fn send(&mut self, message: OutboundMessage) {
        let event = message.event_name();
        if let Err(e) = self.transport.send(message) {
            warn!(event, "failed to send: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
