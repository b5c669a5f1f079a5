/// Command and message handlers
pub mod handlers;
/// Download-and-delivery pipeline
pub mod pipeline;
/// Retrying Telegram send/edit/delete wrappers
pub mod resilient;
/// Outbound transport seam
pub mod sender;
