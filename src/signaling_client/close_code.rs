//! WebSocket close codes the client cares about.

/// Intentional shutdown. Never followed by a reconnect.
pub const NORMAL_CLOSURE: u16 = 1000;
/// Peer sent a close frame without a status.
pub const NO_STATUS: u16 = 1005;
/// Socket dropped without any close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

#[must_use]
pub fn is_normal(code: u16) -> bool {
    code == NORMAL_CLOSURE
}
