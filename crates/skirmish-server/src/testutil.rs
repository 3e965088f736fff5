//! Shared fixtures for the server's unit tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use skirmish_lib::net::{Outbound, Unreachable};
use skirmish_lib::player::Player;

/// In-memory outbound channel: records every line and can be switched to
/// refuse delivery, standing in for a stalled or vanished peer.
pub struct TestChannel {
    sent: Mutex<Vec<String>>,
    broken: AtomicBool,
    closed: AtomicBool,
}

impl TestChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            broken: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        })
    }

    /// Make every send from now on report the peer as unreachable.
    pub fn break_pipe(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn lines(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Outbound for TestChannel {
    fn send(&self, text: &str) -> Result<(), Unreachable> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(Unreachable);
        }
        self.sent.lock().unwrap().push(text.to_owned());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A named player wired to a fresh [`TestChannel`].
pub fn player(name: &str, port: u16) -> (Arc<Player>, Arc<TestChannel>) {
    let chan = TestChannel::new();
    let player = Arc::new(Player::new(
        SocketAddr::from(([127, 0, 0, 1], port)),
        Arc::clone(&chan) as Arc<dyn Outbound>,
    ));
    player.set_name(name);
    (player, chan)
}
