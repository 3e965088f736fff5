use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use skirmish_lib::player::Player;
use skirmish_lib::DEFAULT_ROOM_CAPACITY;

use crate::room::{Room, RoomError, RoomResult};

/// The process-wide name → room mapping. One instance exists per server,
/// created before the accept loop and injected into sessions as a shared
/// handle; tests construct their own.
///
/// The registry lock guards only the map itself and is never held across a
/// room-internal lock acquisition or any I/O.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, Arc<Room>>>,
}

impl RoomRegistry {
    /// Atomically create a room with `host` as its sole member. No two
    /// callers can both observe `name` as absent and both insert.
    pub fn create(self: &Arc<Self>, name: &str, host: Arc<Player>) -> RoomResult<Arc<Room>> {
        self.create_sized(name, host, DEFAULT_ROOM_CAPACITY)
    }

    pub(crate) fn create_sized(
        self: &Arc<Self>,
        name: &str,
        host: Arc<Player>,
        capacity: usize,
    ) -> RoomResult<Arc<Room>> {
        let mut rooms = self.rooms.lock().unwrap();
        if rooms.contains_key(name) {
            return Err(RoomError::DuplicateName(name.to_owned()));
        }
        // Room construction takes no room-internal lock, so holding the
        // registry lock across it cannot invert the room → registry order.
        let room = Room::new(name, host, capacity, Arc::clone(self));
        rooms.insert(name.to_owned(), Arc::clone(&room));
        drop(rooms);
        tracing::info!(room = name, "room created");
        Ok(room)
    }

    /// Live handle to the named room; callers observe later mutation.
    pub fn get(&self, name: &str) -> RoomResult<Arc<Room>> {
        self.rooms
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(name.to_owned()))
    }

    /// Drop the named room from the map. A second call is a no-op.
    pub fn remove(&self, name: &str) {
        if self.rooms.lock().unwrap().remove(name).is_some() {
            tracing::info!(room = name, "room closed");
        }
    }

    /// Snapshot of the open rooms for the lobby browser, sorted by name.
    /// The listing may go stale before it is rendered; that is fine for a
    /// browser.
    pub fn list(&self) -> Vec<(String, Arc<Room>)> {
        let mut rooms: Vec<_> = self
            .rooms
            .lock()
            .unwrap()
            .iter()
            .map(|(name, room)| (name.clone(), Arc::clone(room)))
            .collect();
        rooms.sort_by(|a, b| a.0.cmp(&b.0));
        rooms
    }
}
