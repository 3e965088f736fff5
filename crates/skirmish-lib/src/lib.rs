//! Shared model for the skirmish lobby: session/room statuses, gameplay
//! value primitives, and the player handle with its outbound channel.

pub mod game;
pub mod net;
pub mod player;
pub mod status;

/// How many players a room holds unless told otherwise.
pub const DEFAULT_ROOM_CAPACITY: usize = 2;

/// How many chat lines a room retains before evicting the oldest.
pub const CHAT_LOG_LIMIT: usize = 10;
