use std::fmt::{self, Display};

/// Protocol state of one connected session. Selects which command table is
/// active and which loop the session thread runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Lobby,
    Room,
    /// Reserved for a running match; no current command reaches it.
    InGame,
}

/// Lifecycle state of a room.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoomStatus {
    Waiting,
    Full,
    /// A match is running. Unreachable until match start is wired in.
    Gaming,
}

impl Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Full => "full",
            RoomStatus::Gaming => "gaming",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod test {
    use super::RoomStatus;

    #[test]
    fn status_labels() {
        assert_eq!(RoomStatus::Waiting.to_string(), "waiting");
        assert_eq!(RoomStatus::Full.to_string(), "full");
        assert_eq!(RoomStatus::Gaming.to_string(), "gaming");
    }
}
