use thiserror::Error;

/// The peer behind an outbound channel can no longer accept lines.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("peer unreachable")]
pub struct Unreachable;

/// One session's outbound half.
///
/// `send` must not block: implementations queue the line with bounded
/// effort and report [`Unreachable`] when the peer cannot take it. Room
/// broadcasts treat that as the member having disconnected.
pub trait Outbound: Send + Sync {
    fn send(&self, text: &str) -> Result<(), Unreachable>;

    /// Stop delivery and release the underlying transport. Idempotent.
    fn close(&self);
}
