pub mod action_log;
pub mod mute;
pub mod warn;
