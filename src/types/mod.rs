mod content;
mod message_log;
mod models;

pub use content::{ContentPayload, EntryValue, FileContent};
pub use message_log::{MESSAGE_LOG_CAPACITY, MessageLog};
pub use models::*;
