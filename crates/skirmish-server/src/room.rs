use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use skirmish_lib::player::Player;
use skirmish_lib::status::RoomStatus;
use skirmish_lib::CHAT_LOG_LIMIT;
use thiserror::Error;

use crate::registry::RoomRegistry;
use crate::render;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("a room named '{0}' already exists")]
    DuplicateName(String),
    #[error("there is no room named '{0}'")]
    NotFound(String),
    #[error("the room is full")]
    RoomFull,
}

pub type RoomResult<T> = Result<T, RoomError>;

/// One named room: a capacity-bounded member list sharing a chat log while
/// waiting for a match.
///
/// Lock order is fixed across the whole server: the membership lock comes
/// before the chat lock, and the registry lock is only ever taken while
/// already holding the membership lock (room teardown). No path takes any
/// of them in another order.
pub struct Room {
    name: String,
    capacity: usize,
    members: Mutex<Membership>,
    chat: Mutex<VecDeque<String>>,
    registry: Arc<RoomRegistry>,
}

#[derive(Debug)]
struct Membership {
    list: Vec<Arc<Player>>,
    host: Arc<Player>,
    status: RoomStatus,
}

/// A consistent copy of everything a room view needs, taken under the room
/// locks and rendered outside them.
#[derive(Clone, Debug)]
pub struct RoomSnapshot {
    pub name: String,
    pub capacity: usize,
    pub status: RoomStatus,
    pub host: String,
    pub members: Vec<String>,
    pub chat: Vec<String>,
}

impl Room {
    pub(crate) fn new(
        name: &str,
        host: Arc<Player>,
        capacity: usize,
        registry: Arc<RoomRegistry>,
    ) -> Arc<Self> {
        let status = if capacity <= 1 {
            RoomStatus::Full
        } else {
            RoomStatus::Waiting
        };
        Arc::new(Self {
            name: name.to_owned(),
            capacity,
            members: Mutex::new(Membership {
                list: vec![Arc::clone(&host)],
                host,
                status,
            }),
            chat: Mutex::new(VecDeque::with_capacity(CHAT_LOG_LIMIT)),
            registry,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a member, announce it, and push fresh views to everyone. The
    /// check-append-announce sequence is atomic under the membership lock.
    #[tracing::instrument(skip_all, fields(room = %self.name, player = %player.name()))]
    pub fn join(&self, player: &Arc<Player>) -> RoomResult<()> {
        let stale = {
            let mut m = self.members.lock().unwrap();
            if m.list.len() >= self.capacity {
                return Err(RoomError::RoomFull);
            }
            m.list.push(Arc::clone(player));
            if m.list.len() == self.capacity {
                m.status = RoomStatus::Full;
            }
            tracing::info!("player joined room");
            self.post(&m, None, format!("{} join the room", player.name()))
        };
        self.evict(stale);
        Ok(())
    }

    /// Remove a member. Absent members are a no-op. The last member leaving
    /// deregisters the room; a departing host promotes the member that
    /// joined next.
    #[tracing::instrument(skip_all, fields(room = %self.name, player = %player.name()))]
    pub fn leave(&self, player: &Arc<Player>) {
        let stale = self.leave_inner(player);
        self.evict(stale);
    }

    fn leave_inner(&self, player: &Arc<Player>) -> Vec<Arc<Player>> {
        let mut m = self.members.lock().unwrap();
        let Some(at) = m.list.iter().position(|p| Arc::ptr_eq(p, player)) else {
            return Vec::new();
        };
        m.list.remove(at);
        if m.status != RoomStatus::Gaming && m.list.len() < self.capacity {
            m.status = RoomStatus::Waiting;
        }
        tracing::info!("player left room");

        if m.list.is_empty() {
            // Registry lock nests inside the membership lock, never the
            // other way around.
            self.registry.remove(&self.name);
            return Vec::new();
        }

        let mut stale = self.post(&m, None, format!("{} leave the room", player.name()));
        if Arc::ptr_eq(&m.host, player) {
            let promoted = Arc::clone(&m.list[0]);
            m.host = promoted;
            let line = format!("{} become the new host", m.host.name());
            tracing::info!(host = %m.host.name(), "host changed");
            stale.extend(self.post(&m, None, line));
        }
        stale
    }

    /// Record a chat line from `speaker` and push the updated view to the
    /// other members.
    pub fn say(&self, speaker: &Arc<Player>, content: &str) {
        let stale = {
            let m = self.members.lock().unwrap();
            self.post(
                &m,
                Some(speaker),
                format!("[{}]: {}", speaker.name(), content),
            )
        };
        self.evict(stale);
    }

    /// Append `line` to the chat log and fan the refreshed view out to each
    /// member except `from`. The caller holds the membership lock; this
    /// takes the chat lock (membership → chat order). The channel send is
    /// non-blocking, so no socket I/O happens under either lock. Returns
    /// the members whose channel refused the line.
    fn post(&self, m: &Membership, from: Option<&Arc<Player>>, line: String) -> Vec<Arc<Player>> {
        let snapshot = {
            let mut chat = self.chat.lock().unwrap();
            if chat.len() == CHAT_LOG_LIMIT {
                chat.pop_front();
            }
            chat.push_back(line);
            self.snapshot_locked(m, &chat)
        };

        let mut stale = Vec::new();
        for member in &m.list {
            if from.is_some_and(|speaker| Arc::ptr_eq(speaker, member)) {
                continue;
            }
            let view = render::room_view(member, &snapshot);
            if member.send(&view).is_err() {
                stale.push(Arc::clone(member));
            }
        }
        stale
    }

    /// Force-leave members whose channel came back unreachable during a
    /// broadcast. Works through the normal `leave` path over a snapshot
    /// list; the live member list is never iterated while it shrinks.
    fn evict(&self, mut stale: Vec<Arc<Player>>) {
        while let Some(member) = stale.pop() {
            tracing::warn!(room = %self.name, player = %member.name(), "dropping unreachable member");
            member.hang_up();
            stale.extend(self.leave_inner(&member));
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let m = self.members.lock().unwrap();
        let chat = self.chat.lock().unwrap();
        self.snapshot_locked(&m, &chat)
    }

    fn snapshot_locked(&self, m: &Membership, chat: &VecDeque<String>) -> RoomSnapshot {
        RoomSnapshot {
            name: self.name.clone(),
            capacity: self.capacity,
            status: m.status,
            host: m.host.name(),
            members: m.list.iter().map(|p| p.name()).collect(),
            chat: chat.iter().cloned().collect(),
        }
    }

    /// Match-setup hook, run by the `start` command before [`start_game`].
    ///
    /// [`start_game`]: Room::start_game
    pub fn init_game(&self) {}

    /// Match-start hook. Gameplay wiring attaches here.
    pub fn start_game(&self) {}
}

impl fmt::Debug for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use skirmish_lib::player::Player;
    use skirmish_lib::status::RoomStatus;
    use skirmish_lib::CHAT_LOG_LIMIT;

    use super::{Room, RoomError};
    use crate::registry::RoomRegistry;
    use crate::testutil::{player, TestChannel};

    fn setup(capacity: usize) -> (Arc<RoomRegistry>, Arc<Room>, Arc<Player>, Arc<TestChannel>) {
        let registry = Arc::new(RoomRegistry::default());
        let (host, chan) = player("host", 4000);
        let room = registry
            .create_sized("alpha", Arc::clone(&host), capacity)
            .unwrap();
        (registry, room, host, chan)
    }

    #[test]
    fn join_fills_the_room() {
        let (_registry, room, _host, _chan) = setup(2);
        let (second, _) = player("second", 4001);
        let (third, _) = player("third", 4002);

        room.join(&second).unwrap();
        assert_eq!(room.snapshot().status, RoomStatus::Full);

        assert_eq!(room.join(&third).unwrap_err(), RoomError::RoomFull);
        assert_eq!(room.snapshot().members.len(), 2);
    }

    #[test]
    fn join_announces_to_members() {
        let (_registry, room, _host, host_chan) = setup(2);
        let (second, _) = player("second", 4001);

        room.join(&second).unwrap();
        let last = host_chan.lines().pop().unwrap();
        assert!(last.contains("second join the room"));
    }

    #[test]
    fn say_records_and_delivers_to_others() {
        let (_registry, room, host, host_chan) = setup(2);
        let (second, second_chan) = player("second", 4001);
        room.join(&second).unwrap();

        room.say(&host, "hi ");

        assert!(room.snapshot().chat.contains(&"[host]: hi ".to_owned()));
        let delivered = second_chan.lines().pop().unwrap();
        assert!(delivered.contains("[host]: hi "));
        // The speaker does not get its own chat broadcast.
        assert!(!host_chan.lines().iter().any(|l| l.contains("[host]: hi ")));
    }

    #[test]
    fn leave_promotes_the_next_member() {
        let (_registry, room, host, _chan) = setup(2);
        let (second, _) = player("second", 4001);
        room.join(&second).unwrap();

        room.leave(&host);

        let snap = room.snapshot();
        assert_eq!(snap.status, RoomStatus::Waiting);
        assert_eq!(snap.members, ["second"]);
        assert_eq!(snap.host, "second");
        assert!(snap.chat.contains(&"host leave the room".to_owned()));
        assert!(snap.chat.contains(&"second become the new host".to_owned()));
    }

    #[test]
    fn last_leave_closes_the_room() {
        let (registry, room, host, _chan) = setup(2);
        let (second, _) = player("second", 4001);
        room.join(&second).unwrap();

        room.leave(&host);
        room.leave(&second);

        assert_eq!(
            registry.get("alpha").unwrap_err(),
            RoomError::NotFound("alpha".to_owned())
        );
    }

    #[test]
    fn leaving_twice_is_a_noop() {
        let (_registry, room, host, _chan) = setup(3);
        let (second, _) = player("second", 4001);
        room.join(&second).unwrap();

        room.leave(&second);
        let before = room.snapshot();
        room.leave(&second);
        let after = room.snapshot();

        assert_eq!(before.members, after.members);
        assert_eq!(before.chat, after.chat);
        drop(host);
    }

    #[test]
    fn chat_log_is_bounded_fifo() {
        let (_registry, room, host, _chan) = setup(2);

        for n in 0..15 {
            room.say(&host, &format!("line {n} "));
        }

        let chat = room.snapshot().chat;
        assert_eq!(chat.len(), CHAT_LOG_LIMIT);
        assert_eq!(chat.first().unwrap(), "[host]: line 5 ");
        assert_eq!(chat.last().unwrap(), "[host]: line 14 ");
    }

    #[test]
    fn status_tracks_membership_through_churn() {
        let (_registry, room, _host, _chan) = setup(2);
        let (second, _) = player("second", 4001);

        assert_eq!(room.snapshot().status, RoomStatus::Waiting);
        room.join(&second).unwrap();
        assert_eq!(room.snapshot().status, RoomStatus::Full);
        room.leave(&second);
        assert_eq!(room.snapshot().status, RoomStatus::Waiting);
        room.join(&second).unwrap();
        assert_eq!(room.snapshot().status, RoomStatus::Full);
    }

    #[test]
    fn unreachable_member_is_evicted_without_failing_the_say() {
        let (_registry, room, host, _host_chan) = setup(3);
        let (second, second_chan) = player("second", 4001);
        let (third, third_chan) = player("third", 4002);
        room.join(&second).unwrap();
        room.join(&third).unwrap();

        second_chan.break_pipe();
        room.say(&host, "hi ");

        let snap = room.snapshot();
        assert_eq!(snap.members, ["host", "third"]);
        assert!(second_chan.is_closed());
        // The unaffected member saw the line and the eviction announcement.
        let third_lines = third_chan.lines();
        assert!(third_lines.iter().any(|l| l.contains("[host]: hi ")));
        assert!(third_lines.iter().any(|l| l.contains("second leave the room")));
    }

    #[test]
    fn evicting_the_last_reachable_member_converges() {
        let (registry, room, host, host_chan) = setup(2);
        let (second, second_chan) = player("second", 4001);
        room.join(&second).unwrap();

        // Both peers go dark; the leave announcement must tear the whole
        // room down rather than loop or deadlock.
        host_chan.break_pipe();
        second_chan.break_pipe();
        room.leave(&second);

        assert!(registry.get("alpha").is_err());
        drop(host);
    }

    #[test]
    fn concurrent_joins_admit_exactly_one() {
        let (_registry, room, _host, _chan) = setup(2);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let room = Arc::clone(&room);
                    scope.spawn(move || {
                        let (contender, _) = player("contender", 5000 + i);
                        room.join(&contender).is_ok()
                    })
                })
                .collect();

            let admitted = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count();
            assert_eq!(admitted, 1);
        });

        let snap = room.snapshot();
        assert_eq!(snap.members.len(), 2);
        assert_eq!(snap.status, RoomStatus::Full);
    }
}
