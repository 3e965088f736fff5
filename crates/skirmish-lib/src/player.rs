use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use crate::net::{Outbound, Unreachable};

/// The cross-thread face of one connected client: its display name and the
/// channel other threads use to push lines at it. Everything else about a
/// connection stays private to its own session thread; cross-thread
/// membership changes go through `Room::leave`, never through here.
pub struct Player {
    name: Mutex<String>,
    addr: SocketAddr,
    outbound: Arc<dyn Outbound>,
}

impl Player {
    /// A fresh player named after its peer address until `setname` says
    /// otherwise.
    pub fn new(addr: SocketAddr, outbound: Arc<dyn Outbound>) -> Self {
        Self {
            name: Mutex::new(format!("guest-{}", addr.port())),
            addr,
            outbound,
        }
    }

    pub fn name(&self) -> String {
        self.name.lock().unwrap().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.lock().unwrap() = name.into();
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queue a line for this player with bounded effort.
    pub fn send(&self, text: &str) -> Result<(), Unreachable> {
        self.outbound.send(text)
    }

    /// Close this player's outbound channel.
    pub fn hang_up(&self) {
        self.outbound.close();
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name())
            .field("addr", &self.addr)
            .finish()
    }
}
