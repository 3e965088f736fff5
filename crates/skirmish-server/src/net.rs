//! Socket plumbing: one reader (the session thread itself) and one writer
//! thread per connection, joined by a bounded line queue. All socket writes
//! for a peer happen on its writer thread, so a stalled peer blocks nobody
//! else.

use std::io::{BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;

use skirmish_lib::net::{Outbound, Unreachable};
use skirmish_lib::player::Player;

use crate::session::Session;
use crate::state::ServerState;

/// Lines a broadcast may queue for one peer before it counts as stalled.
const OUTBOUND_BUFFER: usize = 64;

enum OutMsg {
    Line(String),
    /// Flush what is queued, shut the socket down, and stop.
    Hangup,
}

/// The channel end handed to [`Player`]: queues lines for the writer thread
/// with bounded effort. A full queue or a dead writer both mean the peer is
/// unreachable.
pub struct LineSender {
    tx: SyncSender<OutMsg>,
    socket: TcpStream,
}

impl LineSender {
    /// Spawn the writer thread for `socket` and return the sending half.
    pub fn spawn(socket: TcpStream) -> std::io::Result<Self> {
        let writer = socket.try_clone()?;
        let (tx, rx) = sync_channel(OUTBOUND_BUFFER);
        thread::spawn(move || write_loop(writer, rx));
        Ok(Self { tx, socket })
    }
}

impl Outbound for LineSender {
    fn send(&self, text: &str) -> Result<(), Unreachable> {
        self.tx
            .try_send(OutMsg::Line(text.to_owned()))
            .map_err(|_| Unreachable)
    }

    fn close(&self) {
        // Let the writer drain what it can; if the queue is jammed, cut the
        // socket out from under it. Shutting the socket also unblocks the
        // peer's reader thread.
        if self.tx.try_send(OutMsg::Hangup).is_err() {
            let _ = self.socket.shutdown(Shutdown::Both);
        }
    }
}

fn write_loop(socket: TcpStream, rx: Receiver<OutMsg>) {
    let mut out = BufWriter::new(socket);
    while let Ok(msg) = rx.recv() {
        match msg {
            OutMsg::Line(text) => {
                if out
                    .write_all(text.as_bytes())
                    .and_then(|()| out.flush())
                    .is_err()
                {
                    // The peer is gone; dropping the receiver makes every
                    // later send report Unreachable.
                    break;
                }
            }
            OutMsg::Hangup => break,
        }
    }
    let _ = out.flush();
    let _ = out.get_ref().shutdown(Shutdown::Both);
}

/// Serve one accepted connection to completion.
pub fn handle_new_connection(state: ServerState, socket: TcpStream) {
    let peer = match socket.peer_addr() {
        Ok(peer) => peer,
        Err(error) => {
            tracing::warn!(%error, "dropping connection with no peer address");
            return;
        }
    };
    let reader = match socket.try_clone() {
        Ok(reader) => reader,
        Err(error) => {
            tracing::warn!(%peer, %error, "failed to split connection");
            return;
        }
    };
    let outbound = match LineSender::spawn(socket) {
        Ok(outbound) => outbound,
        Err(error) => {
            tracing::warn!(%peer, %error, "failed to start writer thread");
            return;
        }
    };

    let player = Arc::new(Player::new(peer, Arc::new(outbound)));
    let online = state.connect();
    tracing::info!(%peer, online, "connection opened");

    let mut session = Session::new(state.clone(), Arc::clone(&player));
    session.run(&mut BufReader::new(reader));

    player.hang_up();
    state.disconnect();
    tracing::info!(%peer, "connection closed");
}
