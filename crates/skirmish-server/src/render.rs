//! Turns model state into the text screens clients see. Everything here
//! works over data copied out of the locks; nothing mutates shared state.

use std::fmt::Write;

use skirmish_lib::player::Player;

use crate::command::CommandTable;
use crate::registry::RoomRegistry;
use crate::room::RoomSnapshot;

/// Pushed before a re-render so the previous screen scrolls away.
pub const CLEAR_SCREEN: &str = "\n\n\n\n\n\n\n\n\n\n";

pub fn welcome(online: usize) -> String {
    format!("Welcome to the server!\nplayers online: {online}\n")
}

fn player_banner(player: &Player) -> String {
    format!("you are {} ({})\n", player.name(), player.addr())
}

pub fn lobby_view(
    online: usize,
    player: &Player,
    registry: &RoomRegistry,
    table: &CommandTable,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "players online: {online}");
    out.push_str(&player_banner(player));

    out.push_str("\nrooms:\n");
    let rooms = registry.list();
    if rooms.is_empty() {
        out.push_str("  (none yet - create one)\n");
    }
    for (name, room) in rooms {
        let snap = room.snapshot();
        let _ = writeln!(
            out,
            "  {name} [{}/{}] {}",
            snap.members.len(),
            snap.capacity,
            snap.status
        );
    }

    out.push('\n');
    out.push_str(&command_help(table));
    out.push_str("> ");
    out
}

pub fn room_view(player: &Player, snapshot: &RoomSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "room {} [{}/{}] {}",
        snapshot.name,
        snapshot.members.len(),
        snapshot.capacity,
        snapshot.status
    );
    out.push_str(&player_banner(player));

    out.push_str("players:\n");
    for name in &snapshot.members {
        if *name == snapshot.host {
            let _ = writeln!(out, "  {name} (host)");
        } else {
            let _ = writeln!(out, "  {name}");
        }
    }

    out.push_str("chat:\n");
    for line in &snapshot.chat {
        let _ = writeln!(out, "  {line}");
    }
    out.push_str("> ");
    out
}

fn command_help(table: &CommandTable) -> String {
    let mut out = String::from("commands:\n");
    for cmd in table.commands() {
        let _ = writeln!(out, "  {}", cmd.usage());
    }
    out
}
