pub mod phase;
pub mod poll_guard;
pub mod projector;
pub mod session;
pub mod session_events;

// Re-export main components
pub use phase::*;
pub use poll_guard::*;
pub use projector::*;
pub use session::*;
pub use session_events::*;
