//! WebSocket gateway: session registry, wire protocol, event dispatch.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::SessionRegistry;
