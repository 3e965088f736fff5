use thiserror::Error;

use skirmish_lib::status::SessionStatus;

use crate::room::RoomError;
use crate::session::Session;

/// Why a handler produced no result. Collapsed to a display line at the
/// dispatch boundary; never propagated past it and never fatal to the
/// connection.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandFault {
    #[error("missing arguments")]
    Argument,
    #[error(transparent)]
    Cannot(#[from] RoomError),
}

type Handler = fn(&mut Session, &[&str]) -> Result<String, CommandFault>;

pub struct Command {
    name: &'static str,
    usage: &'static str,
    handler: Handler,
    /// Status the session adopts when the handler succeeds.
    next_status: SessionStatus,
}

impl Command {
    pub fn usage(&self) -> &'static str {
        self.usage
    }
}

/// An ordered command set; one table exists per session status that accepts
/// input. Lookup is first-match in registration order.
pub struct CommandTable {
    commands: Vec<Command>,
}

impl CommandTable {
    pub fn lobby() -> Self {
        Self {
            commands: vec![
                Command {
                    name: "setname",
                    usage: "setname <name>",
                    handler: setname,
                    next_status: SessionStatus::Lobby,
                },
                Command {
                    name: "create",
                    usage: "create <room>",
                    handler: create,
                    next_status: SessionStatus::Room,
                },
                Command {
                    name: "join",
                    usage: "join <room>",
                    handler: join,
                    next_status: SessionStatus::Room,
                },
                Command {
                    name: "refresh",
                    usage: "refresh",
                    handler: refresh,
                    next_status: SessionStatus::Lobby,
                },
                Command {
                    name: "exit",
                    usage: "exit",
                    handler: exit,
                    next_status: SessionStatus::Disconnected,
                },
            ],
        }
    }

    pub fn room() -> Self {
        Self {
            commands: vec![
                Command {
                    name: "ready",
                    usage: "ready",
                    handler: ready,
                    next_status: SessionStatus::Room,
                },
                Command {
                    name: "start",
                    usage: "start",
                    handler: start,
                    next_status: SessionStatus::Room,
                },
                Command {
                    name: "leave",
                    usage: "leave",
                    handler: leave,
                    next_status: SessionStatus::Lobby,
                },
                Command {
                    name: "say",
                    usage: "say <words...>",
                    handler: say,
                    next_status: SessionStatus::Room,
                },
            ],
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Resolve one input line to a result line and, on success, the status
    /// the session should adopt. Faults come back as text for the issuing
    /// client only.
    pub fn dispatch(&self, session: &mut Session, line: &str) -> (String, Option<SessionStatus>) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&name) = tokens.first() else {
            return (String::new(), None);
        };
        let Some(cmd) = self.commands.iter().find(|c| c.name == name) else {
            return (format!("== command '{name}' not found =="), None);
        };
        match (cmd.handler)(session, &tokens[1..]) {
            Ok(result) => (result, Some(cmd.next_status)),
            Err(CommandFault::Argument) => (
                format!("== command '{name}' is missing arguments, usage: {} ==", cmd.usage),
                None,
            ),
            Err(CommandFault::Cannot(why)) => {
                (format!("== command '{name}' cannot be done: {why} =="), None)
            }
        }
    }
}

fn setname(session: &mut Session, args: &[&str]) -> Result<String, CommandFault> {
    if args.is_empty() {
        return Err(CommandFault::Argument);
    }
    let name = args.concat();
    session.player().set_name(&name);
    Ok(format!("== your name is now '{name}' =="))
}

fn create(session: &mut Session, args: &[&str]) -> Result<String, CommandFault> {
    let Some(&name) = args.first() else {
        return Err(CommandFault::Argument);
    };
    let room = session.registry().create(name, session.player_arc())?;
    session.enter_room(room);
    Ok(format!("== room '{name}' created =="))
}

fn join(session: &mut Session, args: &[&str]) -> Result<String, CommandFault> {
    let Some(&name) = args.first() else {
        return Err(CommandFault::Argument);
    };
    let room = session.registry().get(name)?;
    room.join(&session.player_arc())?;
    session.enter_room(room);
    Ok(format!("== joined room '{name}' =="))
}

fn refresh(_session: &mut Session, _args: &[&str]) -> Result<String, CommandFault> {
    Ok("== refreshed ==".to_owned())
}

fn exit(_session: &mut Session, _args: &[&str]) -> Result<String, CommandFault> {
    Ok("== bye! ==".to_owned())
}

fn ready(_session: &mut Session, _args: &[&str]) -> Result<String, CommandFault> {
    Ok("== ready is not wired to a match yet ==".to_owned())
}

fn start(session: &mut Session, _args: &[&str]) -> Result<String, CommandFault> {
    let room = session.current_room();
    room.init_game();
    room.start_game();
    Ok("== match start is not wired in yet ==".to_owned())
}

fn leave(session: &mut Session, _args: &[&str]) -> Result<String, CommandFault> {
    let room = session.current_room();
    room.leave(&session.player_arc());
    session.clear_room();
    Ok(format!("== you left room '{}' ==", room.name()))
}

fn say(session: &mut Session, args: &[&str]) -> Result<String, CommandFault> {
    if args.is_empty() {
        return Err(CommandFault::Argument);
    }
    let mut content = String::new();
    for word in args {
        content.push_str(word);
        content.push(' ');
    }
    session.current_room().say(&session.player_arc(), &content);
    Ok("== said ==".to_owned())
}
