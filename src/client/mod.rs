//! Public session façade.
pub mod client_error;
pub mod join_options;
pub mod room_client;
pub mod room_client_config;

pub use client_error::ClientError;
pub use join_options::JoinOptions;
pub use room_client::RoomClient;
pub use room_client_config::RoomClientConfig;
