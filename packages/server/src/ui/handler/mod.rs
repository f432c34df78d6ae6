mod http;
mod websocket;

pub use http::{debug_hub_state, health_check};
pub use websocket::websocket_handler;
