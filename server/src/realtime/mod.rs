/// Live delivery
///
/// Process-local registry of open client channels plus the event payloads
/// pushed through them. Fire-and-forget: nothing is queued for offline
/// users and nothing is replayed on reconnect; missed events are only
/// visible through the next explicit fetch. A multi-instance deployment
/// would need an external pub/sub behind `ConnectionManager`.
pub mod events;
pub mod manager;

pub use events::LiveEvent;
pub use manager::{ConnectionManager, LiveSender};
