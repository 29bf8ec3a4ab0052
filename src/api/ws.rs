//! WebSocket listener sessions.
//!
//! Each connection to `/ws/books` becomes one registered listener: it gets
//! the current collection immediately on connect, then a fresh snapshot
//! after every mutation until it disconnects. Inbound frames carry no
//! application meaning and are consumed purely as liveness signals.

use std::sync::Arc;

use futures::SinkExt;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;
use tracing::warn;
use warp::ws::Message;
use warp::ws::WebSocket;

use crate::BookCatalog;

pub(crate) async fn listener_session(socket: WebSocket, catalog: Arc<BookCatalog>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let listeners = catalog.listeners().clone();
    let id = listeners.register(tx);
    info!("listener {} connected", id);

    // Drain queued snapshots into the socket until either side goes away.
    let forward = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_tx.send(Message::text(payload)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // Initial sync. A storage failure here only costs this listener its
    // first snapshot; the session stays registered for future broadcasts.
    match catalog.snapshot().await {
        Ok(books) => listeners.send_to(id, &books),
        Err(e) => warn!("initial sync for listener {} failed: {}", id, e),
    }

    while let Some(inbound) = ws_rx.next().await {
        match inbound {
            Ok(msg) if msg.is_close() => break,
            Ok(_) => debug!("listener {} liveness frame", id),
            Err(e) => {
                debug!("listener {} socket error: {}", id, e);
                break;
            }
        }
    }

    listeners.deregister(id);
    forward.abort();
    info!("listener {} disconnected", id);
}
