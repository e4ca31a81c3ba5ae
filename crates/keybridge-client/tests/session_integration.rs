//! Integration tests for the keyboard session.
//!
//! # Purpose
//!
//! These tests drive a [`KeyboardSession`] purely through [`SessionEvent`]s,
//! the way the WebSocket client does, and observe it through the recording
//! transport and history view.  They cover:
//!
//! - Key forwarding: one message per non-modifier key-down, held-modifier
//!   repeats swallowed, one `keyRelease` per modifier key-up.
//! - Paste: keystroke count and Shift insertion.
//! - Acknowledgments: FIFO resolution, echoed ids, stray replies.
//! - Connection state: error surfacing, input gating, and abandoning
//!   keystrokes whose connection dropped.
//!
//! # Event timeline used by most tests
//!
//! ```text
//! Connected ─► KeyDown/Paste ... ─► Acknowledged ... ─► Disconnected
//! ```

use keybridge_client::application::{
    Disposition, ErrorKind, KeyboardSession, RawKeyEvent, SessionEvent,
};
use keybridge_client::domain::{ClientConfig, MetaChordPolicy};
use keybridge_client::infrastructure::recording::{RecordingHistory, RecordingTransport};
use keybridge_core::{KeyboardLayout, KeystrokeAck, Modifier, ModifierSnapshot, OutboundMessage};

type TestSession = KeyboardSession<RecordingTransport, RecordingHistory>;

fn session_with(config: &ClientConfig) -> TestSession {
    let mut session =
        KeyboardSession::from_config(config, RecordingTransport::new(), RecordingHistory::new());
    session.dispatch(SessionEvent::Connected);
    session
}

fn connected() -> TestSession {
    session_with(&ClientConfig::default())
}

fn ack(success: bool) -> SessionEvent {
    SessionEvent::Acknowledged(KeystrokeAck { success, id: None })
}

fn paste(text: &str) -> SessionEvent {
    SessionEvent::Paste {
        text: text.to_string(),
        show_history: true,
    }
}

// ── Key forwarding ────────────────────────────────────────────────────────────

#[test]
fn test_every_non_modifier_key_down_is_one_message() {
    // Arrange
    let mut session = connected();
    session.dispatch(SessionEvent::ToggleModifier(Modifier::Ctrl));

    // Act: a key, an auto-repeat of it, and another key
    for event in [
        RawKeyEvent::new(67, "c"),
        RawKeyEvent::new(67, "c").repeated(),
        RawKeyEvent::new(13, "Enter"),
    ] {
        session.dispatch(SessionEvent::KeyDown(event));
        assert!(session.modifiers().manual.snapshot().is_empty());
    }

    // Assert: Ctrl applied to the first keystroke only
    let sent = session.transport().keystrokes();
    assert_eq!(sent.len(), 3);
    assert_eq!(
        sent.iter().map(|k| k.ctrl_key).collect::<Vec<_>>(),
        vec![true, false, false]
    );
}

#[test]
fn test_held_shift_auto_repeat_sends_once() {
    let mut session = connected();
    let shift = RawKeyEvent::new(16, "Shift").with_location(1);

    session.dispatch(SessionEvent::KeyDown(shift.clone()));
    for _ in 0..5 {
        let d = session.dispatch(SessionEvent::KeyDown(shift.clone().repeated()));
        assert_eq!(d, Disposition::Ignored);
    }

    assert_eq!(session.transport().sent.len(), 1);
    assert!(session.modifiers().is_already_pressed(16));
}

#[test]
fn test_ctrl_alt_delete_chord() {
    // Arrange
    let mut session = connected();
    let ctrl = RawKeyEvent::new(17, "Control").with_location(1);
    let alt = RawKeyEvent::new(18, "Alt").with_location(1);
    let mut delete = RawKeyEvent::new(46, "Delete");
    delete.ctrl_key = true;
    delete.alt_key = true;

    // Act: press Ctrl, Alt, Delete; release in reverse
    session.dispatch(SessionEvent::KeyDown(ctrl.clone()));
    session.dispatch(SessionEvent::KeyDown(alt.clone()));
    session.dispatch(SessionEvent::KeyDown(delete.clone()));
    session.dispatch(SessionEvent::KeyUp(delete));
    session.dispatch(SessionEvent::KeyUp(alt));
    session.dispatch(SessionEvent::KeyUp(ctrl));

    // Assert: three keystrokes, then one release per modifier key-up
    let sent = &session.transport().sent;
    assert_eq!(sent.len(), 5);
    assert_eq!(sent[3], OutboundMessage::KeyRelease);
    assert_eq!(sent[4], OutboundMessage::KeyRelease);
    let last = &session.transport().keystrokes()[2];
    assert_eq!(last.display_label(), "Alt+Ctrl+Delete");
}

#[test]
fn test_native_modifier_key_downs_get_short_card_labels() {
    let mut session = connected();
    let ctrl = RawKeyEvent::new(17, "Control")
        .with_location(1)
        .with_modifiers(ModifierSnapshot {
            ctrl: true,
            ..Default::default()
        });
    let mut alt = RawKeyEvent::new(18, "Alt").with_location(2);
    alt.alt_key = true;
    alt.ctrl_key = true;

    session.dispatch(SessionEvent::KeyDown(ctrl));
    session.dispatch(SessionEvent::KeyDown(alt));

    assert_eq!(
        session.history().registered,
        vec![(0, "Ctrl".to_string()), (1, "Ctrl+Alt".to_string())]
    );
}

// ── Paste ─────────────────────────────────────────────────────────────────────

#[test]
fn test_paste_message_count_matches_text() {
    let text = "The Quick (brown) fox: 42!";
    let layout = KeyboardLayout::us_qwerty();
    let shifted = text.chars().filter(|&c| layout.needs_shift(c)).count();
    let mut session = connected();

    let d = session.dispatch(paste(text));

    let expected = text.chars().count() + shifted;
    assert_eq!(d, Disposition::Pasted { sent: expected });
    assert_eq!(session.transport().sent.len(), expected);
    assert_eq!(session.pending_len(), expected);
}

#[test]
fn test_paste_ab1_then_acks_resolve_cards_in_order() {
    // Arrange
    let mut session = connected();
    session.dispatch(paste("Ab1"));

    // Act
    for success in [true, true, false, true] {
        session.dispatch(ack(success));
    }

    // Assert
    let labels: Vec<_> = session
        .history()
        .registered
        .iter()
        .map(|(_, l)| l.as_str())
        .collect();
    assert_eq!(labels, vec!["Shift", "Shift+A", "b", "1"]);
    assert_eq!(
        session.history().resolved,
        vec![(0, true), (1, true), (2, false), (3, true)]
    );
    assert_eq!(session.pending_len(), 0);
}

#[test]
fn test_paste_without_history_shows_no_cards_but_stays_aligned() {
    // Arrange: an untracked-card paste followed by a carded key-down
    let mut session = connected();
    session.dispatch(SessionEvent::Paste {
        text: "Hi".into(),
        show_history: false,
    });
    session.dispatch(SessionEvent::KeyDown(RawKeyEvent::new(13, "Enter")));

    // Act: four acks, FIFO
    for _ in 0..4 {
        session.dispatch(ack(true));
    }

    // Assert: only the Enter card was registered and resolved
    assert_eq!(session.history().registered, vec![(3, "Enter".to_string())]);
    assert_eq!(session.history().resolved, vec![(3, true)]);
}

// ── Acknowledgments ───────────────────────────────────────────────────────────

#[test]
fn test_echoed_ids_resolve_out_of_order() {
    let mut session = connected();
    session.dispatch(paste("xyz"));

    session.dispatch(SessionEvent::Acknowledged(KeystrokeAck {
        success: true,
        id: Some(2),
    }));
    session.dispatch(SessionEvent::Acknowledged(KeystrokeAck {
        success: false,
        id: Some(0),
    }));

    assert_eq!(session.history().resolved, vec![(2, true), (0, false)]);
    assert_eq!(session.pending_len(), 1);
}

#[test]
fn test_extra_ack_is_harmless() {
    let mut session = connected();
    session.dispatch(SessionEvent::KeyDown(RawKeyEvent::new(65, "a")));
    session.dispatch(ack(true));

    // Nothing pending; this one is logged and dropped.
    session.dispatch(ack(true));
    session.dispatch(SessionEvent::Acknowledged(KeystrokeAck {
        success: true,
        id: Some(99),
    }));

    assert_eq!(session.history().resolved, vec![(0, true)]);
    session.dispatch(SessionEvent::KeyDown(RawKeyEvent::new(66, "b")));
    assert_eq!(session.transport().keystrokes().len(), 2);
}

// ── Connection state ──────────────────────────────────────────────────────────

#[test]
fn test_connection_loss_surfaces_reason_and_gates_input() {
    // Arrange
    let mut session = connected();

    // Act
    session.dispatch(SessionEvent::Disconnected {
        reason: "transport closed".into(),
    });
    let key = session.dispatch(SessionEvent::KeyDown(RawKeyEvent::new(65, "a")));
    let pasted = session.dispatch(paste("abc"));

    // Assert
    assert_eq!(
        session.history().errors,
        vec![(ErrorKind::ConnectionLost, "transport closed".to_string())]
    );
    assert_eq!(key, Disposition::Ignored);
    assert_eq!(pasted, Disposition::Pasted { sent: 0 });
    assert!(session.transport().sent.is_empty());
    assert!(!session.is_connected());
}

#[test]
fn test_shutdown_then_disconnect_is_silent_and_reconnect_rearms() {
    let mut session = connected();

    session.dispatch(SessionEvent::ShutdownRequested);
    session.dispatch(SessionEvent::Disconnected {
        reason: "bye".into(),
    });
    assert!(session.history().errors.is_empty());

    // After reconnecting, a later drop is reported again.
    session.dispatch(SessionEvent::Connected);
    session.dispatch(SessionEvent::Disconnected {
        reason: "reset".into(),
    });
    assert_eq!(session.history().errors.len(), 1);
}

#[test]
fn test_reconnect_abandons_stale_keystrokes_and_keeps_fifo_aligned() {
    // Arrange: "ab" is sent, then the connection drops before any reply
    let mut session = connected();
    session.dispatch(paste("ab"));
    session.dispatch(SessionEvent::Disconnected {
        reason: "gone".into(),
    });
    session.dispatch(SessionEvent::Connected);
    session.dispatch(paste("c"));

    // Act: the new connection replies in order, without ids
    session.dispatch(ack(false));

    // Assert: the reply resolves "c", not the stale "a"
    assert_eq!(session.history().abandoned, vec![0, 1]);
    assert_eq!(session.history().resolved, vec![(2, false)]);
    assert_eq!(session.pending_len(), 0);
    assert_eq!(session.abandoned_len(), 2);
}

#[test]
fn test_manual_modifiers_survive_disconnect() {
    let mut session = connected();
    session.dispatch(SessionEvent::Disconnected {
        reason: "gone".into(),
    });
    session.dispatch(SessionEvent::ToggleModifier(Modifier::Alt));
    session.dispatch(SessionEvent::Connected);

    session.dispatch(SessionEvent::KeyDown(RawKeyEvent::new(9, "Tab")));

    assert!(session.transport().keystrokes()[0].alt_key);
}

// ── Meta-chord policy ─────────────────────────────────────────────────────────

fn meta_tab() -> RawKeyEvent {
    let mut event = RawKeyEvent::new(9, "Tab");
    event.meta_key = true;
    event
}

#[test]
fn test_suppress_policy_sends_nothing_for_meta_chords() {
    let config = ClientConfig {
        meta_chord_policy: MetaChordPolicy::Suppress,
        ..Default::default()
    };
    let mut session = session_with(&config);

    let d = session.dispatch(SessionEvent::KeyDown(meta_tab()));

    assert_eq!(d, Disposition::Ignored);
    assert!(session.transport().sent.is_empty());
}

#[test]
fn test_forward_all_policy_tracks_meta_chords() {
    let mut session = connected();

    let d = session.dispatch(SessionEvent::KeyDown(meta_tab()));

    assert_eq!(d, Disposition::Forwarded { sequence_id: Some(0) });
    assert_eq!(session.history().registered, vec![(0, "Meta+Tab".to_string())]);
}

#[test]
fn test_custom_layout_drives_paste() {
    let layout = KeyboardLayout::from_toml_str(
        r#"
        name = "test"
        [key_codes]
        "é" = 50
        "#,
    )
    .unwrap();
    let config = ClientConfig {
        layout,
        ..Default::default()
    };
    let mut session = session_with(&config);

    session.dispatch(paste("é"));

    assert_eq!(session.transport().keystrokes()[0].key_code, Some(50));
}
