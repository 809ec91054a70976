pub mod embeds;
pub mod policy;
pub mod timeouts;
