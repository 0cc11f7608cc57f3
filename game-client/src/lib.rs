pub mod api;
pub mod clock;
pub mod commands;
pub mod config;
pub mod session;

pub use api::{HttpGameApi, RemoteGameApi};
pub use clock::{ClockHandle, SessionClock};
pub use config::Config;
pub use session::{GameSession, SessionError};
