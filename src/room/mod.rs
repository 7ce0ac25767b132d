//! Room membership state: connection phase, roster, presenter queue,
//! screen-share flag and room-wide controls, driven by inbound frames.
pub mod commands;
pub mod room_event;
pub mod room_session;
pub mod session_state;

pub use commands::CommandBuilder;
pub use room_event::RoomEvent;
pub use room_session::{Effect, LocalIdentity, RoomSession};
pub use session_state::{ConnectionPhase, LocalSessionState, PresenterState, RemoteStream};
