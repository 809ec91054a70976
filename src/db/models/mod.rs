mod action_log;
mod mute_record;
mod warn_record;

pub use action_log::{ActionKind, ActionLogEntry};
pub use mute_record::{MuteKind, MuteRecord};
pub use warn_record::WarnRecord;
