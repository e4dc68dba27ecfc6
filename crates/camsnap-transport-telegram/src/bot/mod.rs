/// Command definitions and handlers
pub mod handlers;
/// Delivery of core replies as Telegram messages
pub mod messaging;
