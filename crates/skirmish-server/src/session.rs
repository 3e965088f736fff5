use std::io::BufRead;
use std::sync::Arc;

use skirmish_lib::player::Player;
use skirmish_lib::status::SessionStatus;

use crate::command::CommandTable;
use crate::registry::RoomRegistry;
use crate::render;
use crate::room::Room;
use crate::state::ServerState;

/// Per-connection state and the loop driving it: render a view, read one
/// line, dispatch it, adopt the resulting status. Owned entirely by the
/// connection's thread; everything shared lives behind `Player` and `Room`.
pub struct Session {
    state: ServerState,
    player: Arc<Player>,
    status: SessionStatus,
    room: Option<Arc<Room>>,
}

impl Session {
    pub fn new(state: ServerState, player: Arc<Player>) -> Self {
        Self {
            state,
            player,
            status: SessionStatus::Disconnected,
            room: None,
        }
    }

    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    pub(crate) fn player_arc(&self) -> Arc<Player> {
        Arc::clone(&self.player)
    }

    pub(crate) fn registry(&self) -> &Arc<RoomRegistry> {
        self.state.registry()
    }

    pub(crate) fn room(&self) -> Option<Arc<Room>> {
        self.room.clone()
    }

    pub(crate) fn enter_room(&mut self, room: Arc<Room>) {
        self.room = Some(room);
    }

    pub(crate) fn clear_room(&mut self) {
        self.room = None;
    }

    /// The room this session is in. Room-table commands are only dispatched
    /// from the room loop, which runs with a room set.
    pub(crate) fn current_room(&self) -> Arc<Room> {
        self.room
            .clone()
            .expect("room command dispatched outside a room")
    }

    /// Drive the connection until it disconnects.
    #[tracing::instrument(skip_all, fields(peer = %self.player.addr()))]
    pub fn run(&mut self, input: &mut impl BufRead) {
        if self
            .player
            .send(&render::welcome(self.state.online()))
            .is_err()
        {
            self.disconnect();
            return;
        }
        self.lobby_loop(input);
        tracing::info!("player disconnected");
    }

    fn lobby_loop(&mut self, input: &mut impl BufRead) {
        let table = CommandTable::lobby();
        self.status = SessionStatus::Lobby;
        loop {
            let view = render::lobby_view(
                self.state.online(),
                &self.player,
                self.state.registry(),
                &table,
            );
            if !self.send_or_disconnect(&format!("{}{view}", render::CLEAR_SCREEN)) {
                return;
            }

            let Some(line) = read_line(input) else {
                self.disconnect();
                return;
            };

            let (result, jump) = table.dispatch(self, &line);
            if !self.send_or_disconnect(&format!("{result}\n")) {
                return;
            }

            match jump {
                Some(SessionStatus::Disconnected) => {
                    self.disconnect();
                    return;
                }
                Some(SessionStatus::Room) => {
                    self.status = SessionStatus::Room;
                    self.room_loop(input);
                    if self.status == SessionStatus::Disconnected {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn room_loop(&mut self, input: &mut impl BufRead) {
        let table = CommandTable::room();
        while self.status == SessionStatus::Room {
            let Some(room) = self.room() else { break };
            let view = render::room_view(&self.player, &room.snapshot());
            if !self.send_or_disconnect(&format!("{}{view}", render::CLEAR_SCREEN)) {
                return;
            }

            let Some(line) = read_line(input) else {
                self.disconnect();
                return;
            };

            let (result, jump) = table.dispatch(self, &line);
            if !self.send_or_disconnect(&format!("{result}\n")) {
                return;
            }

            // `leave` is the one command that declares Lobby and ends this
            // loop; everything else keeps the session in the room.
            if let Some(next) = jump {
                self.status = next;
            }
        }
    }

    /// Send to this session's own peer; a refusal means the peer is gone
    /// and the session is over.
    fn send_or_disconnect(&mut self, text: &str) -> bool {
        if self.player.send(text).is_err() {
            self.disconnect();
            return false;
        }
        true
    }

    /// Tear down this session's server-side state: leave any current room
    /// and mark the session done. Safe to call more than once; the
    /// connection wrapper closes the channel afterwards.
    fn disconnect(&mut self) {
        if let Some(room) = self.room.take() {
            room.leave(&self.player);
        }
        self.status = SessionStatus::Disconnected;
    }
}

/// One line from the peer. `None` is a zero-length read (peer closed) or a
/// broken stream, either of which ends the session.
fn read_line(input: &mut impl BufRead) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf),
    }
}
