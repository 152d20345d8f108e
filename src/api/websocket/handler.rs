//! WebSocket connection handler
//!
//! Each socket gets its own [`SyncSession`]. Three tasks run per connection:
//! a ticker that expands queued networks into an outbox, a writer that drains
//! the outbox to the socket, and a reader that applies client commands.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::state::AppState;
use crate::protocol::SessionDescriptor;
use crate::sync::SyncSession;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session = state.open_session();
    let session_id = session.id();
    let (mut sender, mut receiver) = socket.split();
    info!(
        session = session_id,
        opened = state.sessions_opened(),
        "Netgraph client connected"
    );

    let descriptor = SessionDescriptor::new(session_id, state.tick_ms());
    match serde_json::to_string(&descriptor) {
        Ok(json) => {
            if sender.send(Message::Text(json)).await.is_err() {
                return; // Client disconnected immediately
            }
        }
        Err(e) => {
            warn!(session = session_id, error = %e, "Failed to encode session descriptor");
            return;
        }
    }

    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<String>();

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            if sender.send(Message::Text(message)).await.is_err() {
                debug!("WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    let tick_session = session.clone();
    let tick_interval = state.tick_interval;
    let mut tick_task = tokio::spawn(run_ticks(tick_session, outbox_tx, tick_interval));

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if !handle_client_message(&session, msg) {
                break;
            }
        }
    });

    // Whichever side stops first ends the session
    tokio::select! {
        _ = &mut send_task => {},
        _ = &mut tick_task => {},
        _ = &mut recv_task => {},
    }
    send_task.abort();
    tick_task.abort();
    recv_task.abort();

    info!(session = session_id, "Netgraph client disconnected");
}

/// Tick until the outbox closes
async fn run_ticks(
    session: SyncSession,
    mut outbox: mpsc::UnboundedSender<String>,
    period: std::time::Duration,
) {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;
        match session.tick(&mut outbox) {
            Ok(_) => {}
            Err(e) if e.is_recoverable() => {
                warn!(session = session.id(), error = %e, "Synchronization tick skipped");
            }
            Err(e) => {
                warn!(
                    session = session.id(),
                    error = %e,
                    "Synchronization tick failed, closing session"
                );
                break;
            }
        }
    }
}

/// Handle a message from the client
/// Returns false if the connection should be closed
fn handle_client_message(session: &SyncSession, msg: Message) -> bool {
    match msg {
        Message::Text(text) => {
            session.handle_message(&text);
            true
        }
        Message::Binary(_) => true, // Ignore binary messages
        Message::Ping(_) | Message::Pong(_) => true, // Answered by axum
        Message::Close(_) => false, // Client requested close
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::demo_model;
    use std::time::Duration;

    #[test]
    fn test_close_frame_ends_connection() {
        let state = AppState::from_loaded(demo_model().unwrap(), Duration::from_millis(10));
        let session = state.open_session();

        assert!(!handle_client_message(&session, Message::Close(None)));
        assert!(handle_client_message(&session, Message::Binary(vec![1, 2, 3])));
    }

    #[test]
    fn test_text_frames_reach_the_session() {
        let state = AppState::from_loaded(demo_model().unwrap(), Duration::from_millis(10));
        let session = state.open_session();
        let mut outbox: Vec<String> = Vec::new();
        session.tick(&mut outbox).unwrap();

        let frame = r#"{"act":"expand","uid":"memory"}"#.to_string();
        assert!(handle_client_message(&session, Message::Text(frame)));
        assert_eq!(session.pending(), 1);
    }

    #[tokio::test]
    async fn test_ticker_stops_when_outbox_closes() {
        let state = AppState::from_loaded(demo_model().unwrap(), Duration::from_millis(1));
        let session = state.open_session();
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(rx);

        tokio::time::timeout(
            Duration::from_secs(1),
            run_ticks(session, tx, Duration::from_millis(1)),
        )
        .await
        .unwrap();
    }
}
