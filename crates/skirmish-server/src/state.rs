use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::registry::RoomRegistry;

/// Process-wide shared state handed to every connection: the room registry
/// and the online-player count. Built once before the accept loop starts;
/// clones are cheap and share the same interior.
#[derive(Clone, Debug, Default)]
pub struct ServerState {
    registry: Arc<RoomRegistry>,
    online: Arc<AtomicUsize>,
}

impl ServerState {
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Record a newly accepted connection; returns the online count with it
    /// included.
    pub fn connect(&self) -> usize {
        self.online.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn disconnect(&self) {
        self.online.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn online(&self) -> usize {
        self.online.load(Ordering::Relaxed)
    }
}
